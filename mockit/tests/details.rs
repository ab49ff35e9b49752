// vim: tw=80
//! Inspecting objects through the mocking details facade.

use mockit::*;
use mockit::matcher::*;
use pretty_assertions::assert_eq;

trait Methods {}

fn simple_method() -> MethodSignature {
    MethodSignature::new("simpleMethod")
        .param::<i32>()
        .returns::<String>()
}

fn other_method() -> MethodSignature {
    MethodSignature::new("otherMethod")
}

fn named_mock(session: &Session) -> Mock {
    session.mock(MockSettings::of::<dyn Methods>().name("mock").build())
}

mod is_mock {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mock() {
        let session = Session::new();
        let mock = session.mock_of::<dyn Methods>();
        let details = session.mocking_details(Some(&mock));
        assert!(details.is_mock());
        assert!(!details.is_spy());
    }

    #[test]
    fn spy() {
        let session = Session::new();
        let spy = session.spy::<dyn Methods, _>(|inv: &Invocation| -> Outcome {
            Ok(inv.signature().default_return())
        });
        let details = session.mocking_details(Some(&spy));
        assert!(details.is_mock());
        assert!(details.is_spy());
    }

    #[test]
    fn clone_of_a_mock() {
        let session = Session::new();
        let mock = session.mock_of::<dyn Methods>();
        let clone = mock.clone();
        assert!(session.mocking_details(Some(&clone)).is_mock());
    }

    #[test]
    fn null() {
        let session = Session::new();
        let details = session.mocking_details(None);
        assert!(!details.is_mock());
        assert!(!details.is_spy());
    }

    #[test]
    fn not_a_mock() {
        let session = Session::new();
        let s = String::from("foo");
        let details = session.mocking_details(Some(&s));
        assert!(!details.is_mock());
        assert!(!details.is_spy());
    }

    #[test]
    fn mock_of_another_session() {
        let session = Session::new();
        let other = Session::new();
        let mock = other.mock_of::<dyn Methods>();
        assert!(!session.mocking_details(Some(&mock)).is_mock());
    }
}

mod invocations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn in_call_order() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.invoke(simple_method(), args![10]).unwrap();
        mock.invoke(other_method(), args![]).unwrap();

        let invocations = session.mocking_details(Some(&mock))
            .invocations()
            .unwrap();
        let rendered = invocations.iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>();
        assert_eq!(vec!["mock.simpleMethod(10);", "mock.otherMethod();"],
                   rendered);
        assert!(invocations[0].sequence_number() <
                invocations[1].sequence_number());
    }

    #[test]
    fn returned_collection_is_a_copy() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.invoke(simple_method(), args![10]).unwrap();
        mock.invoke(other_method(), args![]).unwrap();

        let details = session.mocking_details(Some(&mock));
        let mut invocations = details.invocations().unwrap();
        invocations.clear();
        assert_eq!(2, details.invocations().unwrap().len());
    }

    #[test]
    fn typed_arguments() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.invoke(simple_method(), args![10]).unwrap();

        let invocations = session.mocking_details(Some(&mock))
            .invocations()
            .unwrap();
        assert_eq!(Some(&10), invocations[0].arg::<i32>(0));
        assert_eq!(None, invocations[0].arg::<u32>(0));
        assert_eq!(None, invocations[0].arg::<i32>(1));
        assert_eq!("simpleMethod", invocations[0].method_name());
        assert_eq!("mock", invocations[0].mock_name());
        assert_eq!(mock.id(), invocations[0].mock());
    }

    #[test]
    fn bound_stubbing() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.stub(InvocationMatcher::new(simple_method(), vec![eq(10)]),
                  [Answer::returns(String::from("ten"))])
            .unwrap();
        mock.invoke(simple_method(), args![10]).unwrap();
        mock.invoke(simple_method(), args![11]).unwrap();

        let invocations = session.mocking_details(Some(&mock))
            .invocations()
            .unwrap();
        assert_eq!(Some(StubbedBy{index: 0}), invocations[0].stubbed_by());
        assert_eq!(None, invocations[1].stubbed_by());
    }

    #[test]
    fn null() {
        let session = Session::new();
        let e = session.mocking_details(None).invocations().unwrap_err();
        assert_eq!(NotAMock::Null, e);
        assert_eq!("Argument passed to mocking_details() should be a mock, \
                   but is null!", e.to_string());
    }

    #[test]
    fn not_a_mock() {
        let session = Session::new();
        let s = String::from("foo");
        let e = session.mocking_details(Some(&s)).invocations().unwrap_err();
        assert_eq!(NotAMock::Instance(TypeInfo::of::<String>()), e);
        assert_eq!("Argument passed to mocking_details() should be a mock, \
                   but is an instance of class alloc::string::String!",
                   e.to_string());
    }
}

mod mock_creation_settings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let session = Session::new();
        let mock = session.mock_of::<dyn Methods>();
        let settings = session.mocking_details(Some(&mock))
            .mock_creation_settings()
            .unwrap();
        assert_eq!(TypeInfo::of::<dyn Methods>(), settings.type_to_mock());
        assert!(settings.extra_interfaces().is_empty());
        assert_eq!("methods", settings.name());
        assert!(settings.default_answer().is_none());
        assert!(!settings.is_spy());
        assert!(!settings.is_lenient());
    }

    #[test]
    fn extra_interfaces() {
        trait Other {}
        let session = Session::new();
        let settings = MockSettings::of::<dyn Methods>()
            .extra_interface::<dyn Other>()
            .extra_interface::<dyn Other>()
            .extra_interface::<dyn Methods>()
            .build();
        let mock = session.mock(settings);
        let settings = session.mocking_details(Some(&mock))
            .mock_creation_settings()
            .unwrap();
        assert_eq!(&[TypeInfo::of::<dyn Other>()][..],
                   settings.extra_interfaces());
    }

    #[test]
    fn spy() {
        let session = Session::new();
        let spy = session.spy::<dyn Methods, _>(|inv: &Invocation| -> Outcome {
            Ok(inv.signature().default_return())
        });
        let settings = session.mocking_details(Some(&spy))
            .mock_creation_settings()
            .unwrap();
        assert!(settings.is_spy());
        assert!(matches!(settings.default_answer(),
                         Some(DefaultAnswer::CallsRealMethods)));
    }

    #[test]
    fn not_a_mock() {
        let session = Session::new();
        let x = 42u32;
        let e = session.mocking_details(Some(&x))
            .mock_creation_settings()
            .unwrap_err();
        assert_eq!(NotAMock::Instance(TypeInfo::of::<u32>()), e);
    }

    #[test]
    fn null() {
        let session = Session::new();
        let e = session.mocking_details(None)
            .mock_creation_settings()
            .unwrap_err();
        assert_eq!("Argument passed to mocking_details() should be a mock, \
                    but is null!",
                   e.to_string());
    }
}

mod stubbings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty() {
        let session = Session::new();
        let mock = named_mock(&session);
        let stubbings = session.mocking_details(Some(&mock))
            .stubbings()
            .unwrap();
        assert!(stubbings.is_empty());
    }

    #[test]
    fn rendering() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.stub(InvocationMatcher::new(simple_method(), vec![eq(1)]),
                  [Answer::returns(String::from("foo"))])
            .unwrap();
        mock.invoke(simple_method(), args![1]).unwrap();

        let stubbings = session.mocking_details(Some(&mock))
            .stubbings()
            .unwrap();
        assert_eq!(1, stubbings.len());
        assert_eq!("mock.simpleMethod(1); stubbed with: [Returns: \"foo\"]",
                   stubbings[0].to_string());
        assert_eq!(1, stubbings[0].used_count());
    }

    #[test]
    fn registration_order() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.stub(InvocationMatcher::new(simple_method(), vec![eq(1)]),
                  [Answer::returns(String::from("one"))])
            .unwrap();
        mock.stub(InvocationMatcher::new(other_method(), vec![]),
                  [Answer::throws("IllegalStateException", "boom")])
            .unwrap();
        mock.invoke(simple_method(), args![1]).unwrap();
        mock.invoke(other_method(), args![]).unwrap_err();

        let stubbings = session.mocking_details(Some(&mock))
            .stubbings()
            .unwrap();
        assert_eq!(0, stubbings[0].index());
        assert_eq!(1, stubbings[1].index());
        assert_eq!("mock.otherMethod(); stubbed with: \
                   [Throws: IllegalStateException: boom]",
                   stubbings[1].to_string());
    }

    #[test]
    fn null() {
        let session = Session::new();
        let e = session.mocking_details(None).stubbings().unwrap_err();
        assert_eq!(NotAMock::Null, e);
    }

    #[test]
    fn not_a_mock() {
        let session = Session::new();
        let x = 42u32;
        let e = session.mocking_details(Some(&x)).stubbings().unwrap_err();
        assert_eq!("Argument passed to mocking_details() should be a mock, \
                    but is an instance of class u32!",
                   e.to_string());
    }

    #[test]
    fn returned_collection_is_a_copy() {
        let session = Session::new();
        let mock = named_mock(&session);
        mock.stub(InvocationMatcher::new(simple_method(), vec![eq(1)]),
                  [Answer::returns(String::from("one"))])
            .unwrap();
        mock.stub(InvocationMatcher::new(other_method(), vec![]),
                  [Answer::returns(())])
            .unwrap();

        let details = session.mocking_details(Some(&mock));
        let mut stubbings = details.stubbings().unwrap();
        assert_eq!(2, stubbings.len());
        stubbings.clear();
        assert_eq!(2, details.stubbings().unwrap().len());
    }
}
