#[test]
fn brite_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/brite_error_pass.rs");
    t.pass("tests/ui/brite_error_status.rs");
}
