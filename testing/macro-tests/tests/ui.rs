#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/smart_enum_pass.rs");
    t.pass("tests/ui/value_object_pass.rs");
    t.pass("tests/ui/union_pass.rs");
}
