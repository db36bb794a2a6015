//! Span 单元测试
//!
//! 测试源位置跟踪的 Position、Span 和 Origin

use crate::util::span::{Origin, Position, Span};

mod position_tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(1, 5);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 5);
    }

    #[test]
    fn test_position_dummy() {
        let pos = Position::dummy();
        assert_eq!(pos.line, 0);
        assert_eq!(pos.column, 0);
    }

    #[test]
    fn test_position_display() {
        let pos = Position::new(10, 20);
        assert_eq!(format!("{}", pos), "10:20");
    }
}

mod span_tests {
    use super::*;

    #[test]
    fn test_span_on_line() {
        let span = Span::on_line(3, 5, 4);
        assert_eq!(span.start, Position::new(3, 5));
        assert_eq!(span.end, Position::new(3, 9));
    }

    #[test]
    fn test_span_is_dummy() {
        assert!(Span::dummy().is_dummy());
        assert!(!Span::on_line(1, 1, 1).is_dummy());
    }

    #[test]
    fn test_span_display() {
        let span = Span::new(Position::new(1, 1), Position::new(1, 10));
        let display = format!("{}", span);
        assert!(display.contains("1:1"));
        assert!(display.contains("1:10"));
    }
}

mod origin_tests {
    use super::*;

    #[test]
    fn test_origin_display_points_at_start() {
        let origin = Origin::new("llint.asm", Span::on_line(42, 5, 4));
        assert_eq!(origin.to_string(), "llint.asm:42:5");
        assert_eq!(origin.line(), 42);
        assert_eq!(origin.file(), "llint.asm");
    }

    #[test]
    fn test_synthetic_origin_has_no_position() {
        let origin = Origin::synthetic();
        assert!(origin.span().is_dummy());
        assert_eq!(origin.to_string(), "<synthetic>");
    }

    #[test]
    fn test_origin_equality_includes_file() {
        let span = Span::on_line(1, 1, 1);
        assert_eq!(Origin::new("a.asm", span), Origin::new("a.asm", span));
        assert_ne!(Origin::new("a.asm", span), Origin::new("b.asm", span));
    }
}
