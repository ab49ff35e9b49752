// vim: tw=80
//! Argument matchers on their own.

use mockit::*;
use mockit::matcher::*;
use pretty_assertions::assert_eq;

mod eq {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal() {
        assert!(eq(5i32).matches(&5i32));
        assert!(eq("x").matches(&"x"));
        assert!(!eq(5i32).matches(&6i32));
    }

    /// Values of different types are never equal
    #[test]
    fn different_types() {
        assert!(!eq(5i32).matches(&5i64));
        assert!(!eq(String::from("x")).matches(&"x"));
    }

    #[test]
    fn null() {
        assert!(eq(Null).matches(&Null));
        assert!(!eq(0u8).matches(&Null));
    }
}

mod any {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn typed() {
        assert!(any::<u32>().matches(&0u32));
        assert!(!any::<u32>().matches(&0i32));
        assert!(!any::<u32>().matches(&Null));
    }

    #[test]
    fn anything() {
        assert!(matcher::anything().matches(&0u32));
        assert!(matcher::anything().matches(&"x"));
        assert!(matcher::anything().matches(&Null));
    }

    #[test]
    fn explain() {
        assert_eq!(Some(String::from("expected type u32, got i32")),
                   any::<u32>().explain(&0i32));
    }
}

mod null {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn is_null() {
        assert!(matcher::is_null().matches(&Null));
        assert!(!matcher::is_null().matches(&0u32));
    }

    #[test]
    fn not_null() {
        assert!(!matcher::not_null().matches(&Null));
        assert!(matcher::not_null().matches(&0u32));
    }
}

mod custom {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn satisfies() {
        let m = matcher::satisfies::<u32, _>(predicate::in_iter([1, 2, 3]));
        assert!(m.matches(&2u32));
        assert!(!m.matches(&4u32));
        assert!(!m.matches(&2i32));
    }

    #[test]
    fn explain() {
        let m = matcher::satisfies::<u32, _>(predicate::gt(5));
        assert!(m.explain(&3u32).is_some());
        assert!(m.explain(&"wrong type").is_none());
    }

    #[test]
    fn function() {
        let m = matcher::function::<String, _>(|s| s.starts_with("foo"));
        assert!(m.matches(&String::from("foobar")));
        assert!(!m.matches(&String::from("bar")));
        assert!(!m.matches(&"foobar"));
    }
}

mod debug {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn matchers() {
        assert_eq!("5", format!("{:?}", eq(5)));
        assert_eq!("\"x\"", format!("{:?}", eq("x")));
        assert_eq!("<any>", format!("{:?}", matcher::anything()));
        assert_eq!("<any u32>", format!("{:?}", any::<u32>()));
        assert_eq!("isNull()", format!("{:?}", matcher::is_null()));
        assert_eq!("notNull()", format!("{:?}", matcher::not_null()));
        assert_eq!("<var > 5>",
                   format!("{:?}", matcher::satisfies::<u32, _>(predicate::gt(5))));
        assert_eq!("<Capturing argument u32>",
                   format!("{:?}", ArgumentCaptor::<u32>::new().capture()));
    }

    #[test]
    fn invocation_matcher() {
        let sig = MethodSignature::new("f").param::<u32>().param::<&str>();
        let m = InvocationMatcher::new(sig, vec![eq(1u32), any::<&str>()]);
        assert_eq!("mock.f(1, <any &str>);", m.display_for("mock").to_string());
    }
}

mod captor {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty() {
        let captor = ArgumentCaptor::<u32>::default();
        assert!(captor.values().is_empty());
        assert_eq!(None, captor.value());
    }

    /// Matching alone does not capture
    #[test]
    fn matching_does_not_capture() {
        let captor = ArgumentCaptor::<u32>::new();
        assert!(captor.capture().matches(&1u32));
        assert!(captor.values().is_empty());
    }
}

mod signature {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity() {
        let a = MethodSignature::new("f").param::<u32>().returns::<u32>();
        let b = MethodSignature::new("f").param::<u32>().returns::<i64>();
        let c = MethodSignature::new("f").param::<i32>().returns::<u32>();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn debug() {
        let sig = MethodSignature::new("f")
            .param::<u32>()
            .param::<String>()
            .returns::<Vec<u8>>();
        assert_eq!("f(u32, String) -> Vec<u8>", format!("{:?}", sig));
    }

    /// Compound types keep their full name
    #[test]
    fn compound_types() {
        assert_eq!("(i32, alloc::string::String)",
                   TypeInfo::of::<(i32, String)>().simple_name());
        assert_eq!("[u8; 4]", TypeInfo::of::<[u8; 4]>().simple_name());
        assert_eq!("&str", TypeInfo::of::<&str>().simple_name());
        assert_eq!("<any (u8, u16)>", format!("{:?}", any::<(u8, u16)>()));
    }
}
