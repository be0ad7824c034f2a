use facet::Facet;
use facet_copier::{CopyErrorKind, Registry, copy};

#[derive(Facet)]
struct Plain {
    status: String,
}

#[derive(Facet, Debug, PartialEq, Default)]
struct Pointer {
    status: Option<String>,
}

#[facet_testhelpers::test]
fn forced_round_trip_through_option() {
    let registry = Registry::new()
        .tag::<Pointer>("status", "force")
        .tag::<Plain>("status", "force");

    let plain = Plain {
        status: "active".to_string(),
    };
    let mut pointer = Pointer::default();
    copy(&plain)
        .with_registry(&registry)
        .to(&mut pointer)
        .unwrap();
    assert_eq!(pointer.status.as_deref(), Some("active"));

    let mut back = Plain {
        status: String::new(),
    };
    copy(&pointer)
        .with_registry(&registry)
        .to(&mut back)
        .unwrap();
    assert_eq!(back.status, "active");
}

#[derive(Facet, Debug, PartialEq)]
struct Status(String);

#[derive(Facet, Debug, PartialEq)]
struct Code(Status);

#[derive(Facet, Debug, PartialEq, Default)]
struct Coded {
    status: Option<Code>,
}

#[facet_testhelpers::test]
fn nested_newtypes_need_force() {
    let plain = Plain {
        status: "X1".to_string(),
    };

    let mut coded = Coded::default();
    copy(&plain).to(&mut coded).unwrap();
    assert_eq!(coded.status, None);

    let registry = Registry::new().tag::<Coded>("status", "force");
    copy(&plain)
        .with_registry(&registry)
        .to(&mut coded)
        .unwrap();
    assert_eq!(coded.status, Some(Code(Status("X1".to_string()))));
}

#[derive(Facet, Debug, PartialEq, Default)]
struct Tracked {
    status: Option<Status>,
}

#[facet_testhelpers::test]
fn wrapping_in_some_and_a_newtype_needs_force() {
    let plain = Plain {
        status: "X2".to_string(),
    };

    let mut tracked = Tracked::default();
    copy(&plain).to(&mut tracked).unwrap();
    assert_eq!(tracked.status, None);

    let registry = Registry::new().tag::<Tracked>("status", "force");
    copy(&plain)
        .with_registry(&registry)
        .to(&mut tracked)
        .unwrap();
    assert_eq!(tracked.status, Some(Status("X2".to_string())));
}

#[derive(Facet)]
struct Wide {
    count: i32,
}

#[derive(Facet, Debug, PartialEq, Default)]
struct Narrow {
    count: u8,
}

#[facet_testhelpers::test]
fn numbers_convert_only_when_forced() {
    let mut narrow = Narrow::default();
    copy(&Wide { count: 42 }).to(&mut narrow).unwrap();
    assert_eq!(narrow.count, 0);

    let registry = Registry::new().tag::<Narrow>("count", "force");
    copy(&Wide { count: 42 })
        .with_registry(&registry)
        .to(&mut narrow)
        .unwrap();
    assert_eq!(narrow.count, 42);

    let err = copy(&Wide { count: -1 })
        .with_registry(&registry)
        .to(&mut narrow)
        .unwrap_err();
    assert_eq!(err.field, Some("count"));
    assert!(matches!(err.kind, CopyErrorKind::TypeMismatch { .. }));
    assert_eq!(narrow.count, 42);
}

#[derive(Facet)]
struct Reading {
    value: f64,
}

#[derive(Facet, Debug, PartialEq, Default)]
struct Gauge {
    value: f32,
}

#[facet_testhelpers::test]
fn forced_floats_must_fit_exactly() {
    let registry = Registry::new().tag::<Gauge>("value", "force");
    let mut gauge = Gauge { value: 1.5 };

    let err = copy(&Reading { value: 1e300 })
        .with_registry(&registry)
        .to(&mut gauge)
        .unwrap_err();
    assert_eq!(err.field, Some("value"));
    assert!(matches!(err.kind, CopyErrorKind::TypeMismatch { .. }));
    assert_eq!(gauge.value, 1.5);

    copy(&Reading { value: 0.25 })
        .with_registry(&registry)
        .to(&mut gauge)
        .unwrap();
    assert_eq!(gauge.value, 0.25);
}

#[derive(Facet)]
struct Person {
    full_name: String,
    email: String,
}

#[derive(Facet, Debug, PartialEq, Default)]
struct Account {
    name: String,
    email: String,
}

#[facet_testhelpers::test]
fn skip_is_never_written() {
    let registry = Registry::new().tag::<Account>("email", "skip");
    let person = Person {
        full_name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut account = Account {
        name: String::new(),
        email: "old@example.com".to_string(),
    };

    copy(&person)
        .with_registry(&registry)
        .to(&mut account)
        .unwrap();
    assert_eq!(account.email, "old@example.com");
}

#[facet_testhelpers::test]
fn field_directive_renames_the_source() {
    let registry = Registry::new().tag::<Account>("name", "field:full_name");
    let person = Person {
        full_name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut account = Account::default();

    copy(&person)
        .with_registry(&registry)
        .to(&mut account)
        .unwrap();
    assert_eq!(
        account,
        Account {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    );
}

#[facet_testhelpers::test]
fn source_side_skip_hides_the_field() {
    let registry = Registry::new().tag::<Person>("email", "skip");
    let person = Person {
        full_name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut account = Account::default();

    copy(&person)
        .with_registry(&registry)
        .to(&mut account)
        .unwrap();
    assert!(account.email.is_empty());
}

#[derive(Facet)]
struct Employee {
    name: String,
    salary: u32,
}

#[derive(Facet, Debug, PartialEq, Default)]
struct EmployeeView {
    name: String,
    salary: u32,
}

#[facet_testhelpers::test]
fn context_gates_fields() {
    let registry = Registry::new().tag::<EmployeeView>("salary", "context:admin, context:hr");
    let employee = Employee {
        name: "Bob".to_string(),
        salary: 5000,
    };

    let mut public = EmployeeView::default();
    copy(&employee)
        .with_registry(&registry)
        .to(&mut public)
        .unwrap();
    assert_eq!(public.name, "Bob");
    assert_eq!(public.salary, 0);

    let mut hr = EmployeeView::default();
    copy(&employee)
        .with_registry(&registry)
        .context("hr")
        .to(&mut hr)
        .unwrap();
    assert_eq!(hr.salary, 5000);
}

#[facet_testhelpers::test]
fn unknown_directive_tokens_are_ignored() {
    let registry = Registry::new().tag::<Account>("email", "omitempty, frobnicate:yes");
    let person = Person {
        full_name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut account = Account::default();

    copy(&person)
        .with_registry(&registry)
        .to(&mut account)
        .unwrap();
    assert_eq!(account.email, "ada@example.com");
}

#[facet_testhelpers::test]
fn later_tag_replaces_earlier_one() {
    let registry = Registry::new()
        .tag::<Account>("email", "skip")
        .tag::<Account>("email", "force");
    let directive = registry
        .directive(<Account as Facet>::SHAPE, "email")
        .unwrap();
    assert!(directive.force);
    assert!(!directive.skip);
}
