//! Multi-step forms: state fields, navigation and the step queries.

mod harness;

use anyhow::Result;
use formgate::{
    FieldBuilder, FieldOverrides, Form, FormError, SchemaBuilder, Setting, StepForm, Value,
};
use harness::{names, query, step_params, steps_schema};
use std::sync::Arc;

/// Point the form at `target`, or drop the target so the next request stays put.
fn retarget(t: &mut StepForm, target: Option<String>) -> Result<()> {
    match target {
        Some(step) => {
            t.set_target(&step)?;
        }
        None => {
            t.unset("next")?;
        }
    }
    Ok(())
}

/// Submit the form as a client would: its own parameters plus `params`.
fn submit(t: &StepForm, params: &str) -> Result<StepForm> {
    let url = t.extend_url(&format!("?{}", params));
    Ok(StepForm::from_request(steps_schema(), &query(&url))?)
}

// ============================================================================
// State fields
// ============================================================================

#[test]
fn test_step_state_fields() {
    let schema = SchemaBuilder::new("one")
        .steps(&[("a", Some("A"))])
        .build()
        .unwrap();
    let f = StepForm::new(Arc::new(schema)).unwrap();
    assert_eq!(names(&f.optional_fields()), ["step", "next", "last", "seen"]);
    assert_eq!(names(&f.enabled_fields()), ["step", "next", "last", "seen"]);
    assert_eq!(names(&f.hidden_fields()), ["step", "last", "seen"]);
    assert_eq!(names(&f.ignored_fields()), ["next"]);
    assert!(f.visible_fields().is_empty());
    assert_eq!(names(&f.scalar_fields()), ["step", "next", "last", "seen"]);
}

#[test]
fn test_steps_are_defined_once() {
    let err = SchemaBuilder::new("twice")
        .steps(&[("a", None)])
        .steps(&[("b", None)])
        .build()
        .unwrap_err();
    assert_eq!(err, FormError::StepsRedefined("twice".into()));

    let err = SchemaBuilder::new("none").steps(&[]).build().unwrap_err();
    assert_eq!(err, FormError::NoSteps("none".into()));
}

#[test]
fn test_step_state_can_be_copied_into_plain_schemas() -> Result<()> {
    let source = steps_schema();
    let schema = SchemaBuilder::new("summary")
        .copy_fields(&source, &["step", "seen", "email"], FieldOverrides::new())
        .build()?;
    let f = Form::from_request(Arc::new(schema), &query("step=email&seen=bogus&email=a@b.c"));
    assert_eq!(f.field_names(), ["step", "seen", "email"]);
    assert_eq!(f.value("step")?, Some(&Value::from("email")));
    assert_eq!(f.value("seen")?, None);
    assert!(f.is_valid());

    let err = SchemaBuilder::new("summary")
        .copy_fields(&source, &["step"], FieldOverrides::new())
        .steps(&[("a", None)])
        .build()
        .unwrap_err();
    assert_eq!(err, FormError::DuplicateField("step".into()));

    let err = SchemaBuilder::new("renamed")
        .copy_fields(&source, &["email"], FieldOverrides::new().name("errors"))
        .build()
        .unwrap_err();
    assert_eq!(err, FormError::ReservedName("errors".into()));

    let err = SchemaBuilder::new("plain")
        .field(FieldBuilder::new("seen"))
        .build()
        .unwrap_err();
    assert_eq!(err, FormError::ReservedName("seen".into()));
    Ok(())
}

#[test]
fn test_valid_step_parameters_are_accepted() {
    let t = StepForm::from_request(
        steps_schema(),
        &query("?step=email&next=name&seen=intro&last=email"),
    )
    .unwrap();
    assert_eq!(t.step(), "email");
    assert_eq!(t.target(), Some("name"));
    assert_eq!(t.seen(), Some("email"));
    assert_eq!(t.last(), Some("email"));
}

#[test]
fn test_invalid_step_parameters_are_ignored() {
    let t = StepForm::from_request(steps_schema(), &query("?step=a&next=b&seen=c&last=d")).unwrap();
    assert_eq!(t.step(), "intro");
    assert_eq!(t.target(), Some("intro"));
    assert_eq!(t.seen(), None);
    assert_eq!(t.last(), Some("intro"));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_progressing_through_all_steps() -> Result<()> {
    let mut refs = vec![
        "step=intro&next=intro&last=intro",
        "step=email&next=email&last=email&seen=intro",
        "step=name&next=name&last=name&seen=email&email=john%40foo.com",
        "step=address&next=address&last=address&seen=name&email=john%40foo.com",
        "step=message&next=message&last=message&seen=address&email=john%40foo.com",
        "step=post&next=post&last=post&seen=message&email=john%40foo.com&message=blah",
        "step=post&next=post&last=post&seen=post&email=john%40foo.com&message=blah",
    ]
    .into_iter();

    let mut seen: Vec<String> = Vec::new();
    let mut t = StepForm::new(steps_schema())?;
    while t.seen() != Some("post") {
        assert_eq!(t.query_string(), refs.next().unwrap());

        let previous = seen.last().map(String::as_str);
        assert_eq!(Some(t.step()), t.next_step(previous));
        assert_eq!(t.target(), Some(t.step()));
        assert_eq!(t.seen(), previous);
        assert_eq!(t.last(), Some(t.step()));

        seen.push(t.step().to_string());
        let params = step_params(Some(t.step()));
        let target = t.next_step(Some(t.step())).map(str::to_string);
        retarget(&mut t, target)?;
        t = submit(&t, params)?;
    }

    assert_eq!(t.query_string(), refs.next().unwrap());
    assert!(refs.next().is_none());
    assert_eq!(seen, t.steps());
    Ok(())
}

#[test]
fn test_progress_waits_for_valid_steps() -> Result<()> {
    let refs = [
        "step=intro&next=intro&last=intro",
        "step=email&next=email&last=email&seen=intro",
        "step=email&next=name&last=email&seen=email",
        "step=name&next=name&last=name&seen=email&email=john%40foo.com",
        "step=address&next=address&last=address&seen=name&email=john%40foo.com",
        "step=message&next=message&last=message&seen=address&email=john%40foo.com",
        "step=message&next=post&last=message&seen=message&email=john%40foo.com",
        "step=post&next=post&last=post&seen=message&email=john%40foo.com&message=blah",
        "step=post&next=post&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=post&next=post&last=post&seen=post&email=john%40foo.com&message=blah",
    ];

    let mut t = StepForm::new(steps_schema())?;
    for expected in refs {
        assert_eq!(t.query_string(), expected);
        let params = step_params(t.seen());
        let target = t.next_step(Some(t.step())).map(str::to_string);
        retarget(&mut t, target)?;
        t = submit(&t, params)?;
    }
    Ok(())
}

#[test]
fn test_stepping_back_through_all_steps() -> Result<()> {
    let mut refs = vec![
        "step=post&next=post&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=message&next=message&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=address&next=address&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=name&next=name&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=email&next=email&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=intro&next=intro&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=intro&next=intro&last=post&seen=post&email=john%40foo.com&message=blah",
    ];

    let mut seen: Vec<String> = Vec::new();
    let mut t = StepForm::from_request(steps_schema(), &query(&format!("?{}", refs[0])))?;
    while refs.len() > 1 {
        assert_eq!(t.query_string(), refs.remove(0));
        seen.push(t.step().to_string());
        let target = t.previous_step(Some(t.step())).map(str::to_string);
        retarget(&mut t, target)?;
        t = submit(&t, "")?;
    }

    assert_eq!(t.query_string(), refs.remove(0));
    let mut steps = t.steps();
    steps.reverse();
    assert_eq!(seen, steps);
    Ok(())
}

#[test]
fn test_stepping_back_waits_for_valid_steps() -> Result<()> {
    let refs = [
        "step=post&next=intro&last=post&seen=post",
        "step=message&next=message&last=post&seen=post",
        "step=message&next=address&last=post&seen=post",
        "step=address&next=address&last=post&seen=post&message=blah",
        "step=name&next=name&last=post&seen=post&message=blah",
        "step=email&next=email&last=post&seen=post&message=blah",
        "step=email&next=intro&last=post&seen=post&message=blah",
        "step=intro&next=intro&last=post&seen=post&email=john%40foo.com&message=blah",
        "step=intro&next=intro&last=post&seen=post&email=john%40foo.com&message=blah",
    ];

    let mut t = StepForm::new(steps_schema())?;
    t.unlock_steps()?;
    let last = t.last_step().to_string();
    t.set_step(&last)?;

    // Fill in a step only once the form refused to leave it.
    let mut params = "";
    for expected in refs {
        assert_eq!(t.query_string(), expected);
        if t.target() != Some(t.step()) {
            params = step_params(Some(t.step()));
        }
        let target = t.previous_step(Some(t.step())).map(str::to_string);
        retarget(&mut t, target)?;
        t = submit(&t, params)?;
    }
    Ok(())
}

#[test]
fn test_step_names_are_validated_on_write() -> Result<()> {
    let mut t = StepForm::new(steps_schema())?;
    assert_eq!(t.set_step("foo").unwrap_err(), FormError::InvalidStep("foo".into()));
    assert_eq!(t.set_target("foo").unwrap_err(), FormError::InvalidStep("foo".into()));
    t.set_step("name")?;
    assert_eq!(t.step(), "name");
    Ok(())
}

#[test]
fn test_schema_without_steps() {
    let plain = Arc::new(SchemaBuilder::new("plain").build().unwrap());
    let err = StepForm::new(plain).unwrap_err();
    assert_eq!(err, FormError::NoSteps("plain".into()));
}

// ============================================================================
// Step queries
// ============================================================================

#[test]
fn test_fields_of_individual_steps() -> Result<()> {
    let t = StepForm::from_request(
        steps_schema(),
        &query("?step=name&next=address&seen=message&last=message"),
    )?;
    assert_eq!(names(&t.current_fields()), ["street", "city", "zip"]);
    assert_eq!(
        names(&t.other_fields()),
        [
            "step", "next", "last", "seen", "email", "first_name", "last_name", "message",
            "comment", "url"
        ]
    );
    assert_eq!(names(&t.step_fields("email")?), ["email"]);
    assert_eq!(names(&t.step_fields("name")?), ["first_name", "last_name"]);
    assert!(t.step_fields("post")?.is_empty());
    assert!(t.step_fields("foo").is_err());
    Ok(())
}

fn details_form() -> StepForm {
    StepForm::from_request(
        steps_schema(),
        &query("?step=name&next=address&seen=name&last=name&first_name=John&comment=Blah"),
    )
    .unwrap()
}

#[test]
fn test_step_table() -> Result<()> {
    let t = details_form();
    let table: Vec<(&str, Option<&str>)> = t
        .form_steps()
        .iter()
        .map(|(k, n)| (k.as_str(), n.as_deref()))
        .collect();
    assert_eq!(
        table,
        [
            ("intro", Some("Intro")),
            ("email", Some("Email")),
            ("name", Some("Name")),
            ("address", Some("Address")),
            ("message", Some("Message")),
            ("post", None),
        ]
    );
    assert_eq!(t.steps(), ["intro", "email", "name", "address", "message", "post"]);

    assert_eq!(t.current_step_name(), Some("Address"));
    assert_eq!(t.step_name(Some("email")), Some("Email"));
    assert_eq!(t.step_name(Some("post")), None);
    assert_eq!(t.step_name(Some("foo")), None);
    assert_eq!(t.step_name(None), None);
    assert_eq!(
        t.step_names(),
        [
            ("intro", "Intro"),
            ("email", "Email"),
            ("name", "Name"),
            ("address", "Address"),
            ("message", "Message"),
        ]
    );

    assert_eq!(t.step_index(t.step())?, 3);
    assert_eq!(t.step_index("intro")?, 0);
    assert_eq!(t.step_index("post")?, 5);
    assert!(t.step_index("foo").is_err());
    Ok(())
}

#[test]
fn test_step_order() -> Result<()> {
    let t = details_form();

    for (step, before, after) in [
        ("intro", false, true),
        ("name", false, true),
        ("address", false, false),
        ("message", true, false),
        ("post", true, false),
    ] {
        assert_eq!(t.step_before(step)?, before, "{}", step);
        assert_eq!(t.step_after(step)?, after, "{}", step);
    }
    assert!(t.step_before("foo").is_err());

    assert_eq!(t.first_step(), "intro");
    assert_eq!(t.first_step_of(&[None])?, None);
    assert_eq!(t.first_step_of(&[None, None])?, None);
    assert_eq!(t.first_step_of(&[Some("post")])?, Some("post"));
    assert_eq!(t.first_step_of(&[Some("address"), Some("email")])?, Some("email"));
    assert_eq!(t.first_step_of(&[None, Some("name"), Some("address")])?, Some("name"));
    assert_eq!(t.first_step_of(&[Some("post"), None, Some("email")])?, Some("email"));
    assert!(t.first_step_of(&[Some("foo")]).is_err());
    assert!(t.first_step_of(&[Some("email"), Some("foo")]).is_err());
    assert!(t.first_step_of(&[None, Some("foo"), Some("address")]).is_err());

    assert_eq!(t.last_step(), "post");
    assert_eq!(t.last_step_of(&[None])?, None);
    assert_eq!(t.last_step_of(&[Some("address"), Some("email")])?, Some("address"));
    assert_eq!(t.last_step_of(&[None, Some("name"), Some("address")])?, Some("address"));
    assert_eq!(t.last_step_of(&[Some("post"), None, Some("email")])?, Some("post"));
    assert!(t.last_step_of(&[None, Some("foo"), Some("address")]).is_err());

    assert!(!t.is_first_step(Some(t.step())));
    assert!(t.is_first_step(Some("intro")));
    assert!(!t.is_first_step(Some("email")));
    assert!(!t.is_first_step(None));
    assert!(!t.is_first_step(Some("foo")));

    assert!(!t.is_last_step(Some(t.step())));
    assert!(t.is_last_step(Some("post")));
    assert!(!t.is_last_step(Some("message")));
    assert!(!t.is_last_step(None));
    assert!(!t.is_last_step(Some("foo")));
    Ok(())
}

#[test]
fn test_neighbouring_steps() {
    let t = details_form();
    let all = ["intro", "email", "name", "address", "message", "post"];

    assert_eq!(t.previous_steps(Some(t.step())), ["intro", "email", "name"]);
    assert!(t.previous_steps(None).is_empty());
    assert!(t.previous_steps(Some("intro")).is_empty());
    assert_eq!(t.previous_steps(Some("name")), ["intro", "email"]);
    assert_eq!(t.previous_steps(Some("post")), all[..5]);
    assert!(t.previous_steps(Some("foo")).is_empty());

    assert_eq!(t.next_steps(Some(t.step())), ["message", "post"]);
    assert_eq!(t.next_steps(None), all);
    assert_eq!(t.next_steps(Some("intro")), all[1..]);
    assert_eq!(t.next_steps(Some("name")), ["address", "message", "post"]);
    assert!(t.next_steps(Some("post")).is_empty());
    assert_eq!(t.next_steps(Some("foo")), all);

    assert_eq!(t.previous_step(Some(t.step())), Some("name"));
    assert_eq!(t.previous_step(None), None);
    assert_eq!(t.previous_step(Some("intro")), None);
    assert_eq!(t.previous_step(Some("name")), Some("email"));
    assert_eq!(t.previous_step(Some("post")), Some("message"));
    assert_eq!(t.previous_step(Some("foo")), None);

    assert_eq!(t.next_step(Some(t.step())), Some("message"));
    assert_eq!(t.next_step(None), Some("intro"));
    assert_eq!(t.next_step(Some("intro")), Some("email"));
    assert_eq!(t.next_step(Some("name")), Some("address"));
    assert_eq!(t.next_step(Some("post")), None);
    assert_eq!(t.next_step(Some("foo")), Some("intro"));

    assert_eq!(t.previous_step_name(), Some("Name"));
    assert_eq!(t.next_step_name(), Some("Message"));
}

/// Checks one per-step predicate against its expected value for every step,
/// the current one, and an unknown name.
fn assert_predicate(
    t: &StepForm,
    what: &str,
    pred: fn(&StepForm, &str) -> formgate::Result<bool>,
    expected: [bool; 6],
) {
    let steps = t.steps();
    for (step, want) in steps.iter().zip(expected) {
        assert_eq!(pred(t, step).unwrap(), want, "{} {}", what, step);
    }
    let current = steps.iter().position(|s| *s == t.step()).unwrap();
    assert_eq!(pred(t, t.step()).unwrap(), expected[current], "{} current", what);
    assert!(pred(t, "foo").is_err(), "{} foo", what);
}

#[test]
fn test_step_classification() {
    let t = details_form();

    assert_predicate(&t, "extra", StepForm::is_extra_step, [true, false, false, false, false, true]);
    assert_predicate(&t, "regular", StepForm::is_regular_step, [false, true, true, true, true, false]);
    assert_eq!(t.extra_steps(), ["intro", "post"]);
    assert_eq!(t.regular_steps(), ["email", "name", "address", "message"]);

    assert_predicate(&t, "required", StepForm::is_required_step, [false, true, false, false, true, false]);
    assert_predicate(&t, "optional", StepForm::is_optional_step, [true, false, true, true, false, true]);
    assert_eq!(t.required_steps(), ["email", "message"]);
    assert_eq!(t.optional_steps(), ["name", "address"]);

    assert_predicate(&t, "filled", StepForm::is_filled_step, [true, false, true, false, true, true]);
    assert_predicate(&t, "unfilled", StepForm::is_unfilled_step, [false, true, false, true, false, false]);
    assert_eq!(t.filled_steps(), ["name", "message"]);
    assert_eq!(t.unfilled_steps(), ["email", "address"]);

    assert_predicate(&t, "correct", StepForm::is_correct_step, [true, false, true, true, false, true]);
    assert_predicate(&t, "incorrect", StepForm::is_incorrect_step, [false, true, false, false, true, false]);
    assert_eq!(t.correct_steps(), ["name", "address"]);
    assert_eq!(t.incorrect_steps(), ["email", "message"]);
    assert_eq!(t.incorrect_step(), Some("email"));

    let mut d = t.duplicate();
    d.set("email", "x@foo.com").unwrap();
    assert_eq!(d.incorrect_step(), Some("message"));
    d.set("message", "bar").unwrap();
    assert_eq!(d.incorrect_step(), None);

    assert_predicate(&t, "enabled", StepForm::is_enabled_step, [true; 6]);
    assert_predicate(&t, "disabled", StepForm::is_disabled_step, [false; 6]);
    assert_eq!(t.enabled_steps(), ["email", "name", "address", "message"]);
    assert!(t.disabled_steps().is_empty());
}

#[test]
fn test_disabled_steps() {
    let t = details_form();
    let table: Vec<(&str, Option<&str>)> = t
        .form_steps()
        .iter()
        .map(|(k, n)| (k.as_str(), n.as_deref()))
        .collect();
    let visible = names(&t.visible_fields());
    let visible: Vec<&str> = visible.iter().map(String::as_str).collect();

    let schema = SchemaBuilder::new("partly_disabled")
        .steps(&table)
        .copy_fields(
            t.schema(),
            &visible,
            FieldOverrides::new().disabled(Setting::computed(|f| {
                ["first_name", "last_name", "comment"].contains(&f.name())
            })),
        )
        .build()
        .unwrap();
    let f = StepForm::new(Arc::new(schema)).unwrap();
    assert_eq!(names(&f.disabled_fields()), ["first_name", "last_name", "comment"]);
    assert_eq!(f.enabled_steps(), ["email", "address", "message"]);
    assert_eq!(f.disabled_steps(), ["name"]);
    assert!(f.is_disabled_step("name").unwrap());
}

// ============================================================================
// Progress
// ============================================================================

fn assert_progress_predicates(t: &StepForm) {
    type Pred = fn(&StepForm, &str) -> formgate::Result<bool>;
    type List = for<'a> fn(&'a StepForm) -> Vec<&'a str>;
    let table: [(&str, Pred, List); 8] = [
        ("finished", StepForm::is_finished_step, StepForm::finished_steps),
        ("unfinished", StepForm::is_unfinished_step, StepForm::unfinished_steps),
        ("accessible", StepForm::is_accessible_step, StepForm::accessible_steps),
        ("inaccessible", StepForm::is_inaccessible_step, StepForm::inaccessible_steps),
        ("complete", StepForm::is_complete_step, StepForm::complete_steps),
        ("incomplete", StepForm::is_incomplete_step, StepForm::incomplete_steps),
        ("good", StepForm::is_good_step, StepForm::good_steps),
        ("bad", StepForm::is_bad_step, StepForm::bad_steps),
    ];
    for (what, pred, list) in table {
        let members = list(t);
        assert_eq!(pred(t, t.step()).unwrap(), members.contains(&t.step()), "{}", what);
        for step in t.steps() {
            assert_eq!(pred(t, step).unwrap(), members.contains(&step), "{} {}", what, step);
        }
        assert!(pred(t, "foo").is_err(), "{}", what);
    }
}

#[test]
fn test_progress_of_a_form_in_flight() {
    let t = details_form();
    assert_eq!(t.finished_steps(), ["intro", "email", "name"]);
    assert_eq!(t.unfinished_steps(), ["address", "message", "post"]);
    assert_eq!(t.accessible_steps(), ["intro", "email", "name", "address"]);
    assert_eq!(t.inaccessible_steps(), ["message", "post"]);
    assert_eq!(t.complete_steps(), ["intro", "name"]);
    assert_eq!(t.incomplete_steps(), ["email"]);
    assert_eq!(t.good_steps(), ["name"]);
    assert_eq!(t.bad_steps(), ["email"]);
    assert_progress_predicates(&t);
}

#[test]
fn test_progress_of_a_fresh_form() {
    let t = StepForm::new(steps_schema()).unwrap();
    assert!(t.finished_steps().is_empty());
    assert_eq!(
        t.unfinished_steps(),
        ["intro", "email", "name", "address", "message", "post"]
    );
    assert_eq!(t.accessible_steps(), ["intro"]);
    assert_eq!(
        t.inaccessible_steps(),
        ["email", "name", "address", "message", "post"]
    );
    assert!(t.complete_steps().is_empty());
    assert!(t.incomplete_steps().is_empty());
    assert!(t.good_steps().is_empty());
    assert!(t.bad_steps().is_empty());
    assert_progress_predicates(&t);
}

#[test]
fn test_progress_of_an_unlocked_form() {
    let mut t = StepForm::new(steps_schema()).unwrap();
    t.unlock_steps().unwrap();
    let all = ["intro", "email", "name", "address", "message", "post"];
    assert_eq!(t.finished_steps(), all);
    assert!(t.unfinished_steps().is_empty());
    assert_eq!(t.accessible_steps(), all);
    assert!(t.inaccessible_steps().is_empty());
    assert_eq!(t.complete_steps(), ["intro", "name", "address", "post"]);
    assert_eq!(t.incomplete_steps(), ["email", "message"]);
    assert!(t.good_steps().is_empty());
    assert_eq!(t.bad_steps(), ["email", "message"]);
    assert_progress_predicates(&t);
}

// ============================================================================
// Three-step walkthrough
// ============================================================================

fn abc_schema(b_field: Option<FieldBuilder>) -> Arc<formgate::Schema> {
    let mut builder = SchemaBuilder::new("abc")
        .steps(&[("a", Some("A")), ("b", Some("B")), ("c", Some("C"))])
        .required(FieldBuilder::new("x").tag("a"));
    if let Some(field) = b_field {
        builder = builder.required(field.tag("b"));
    }
    Arc::new(builder.build().unwrap())
}

#[test]
fn test_three_step_walkthrough() -> Result<()> {
    let schema = abc_schema(None);
    let t = StepForm::new(Arc::clone(&schema))?;
    assert_eq!(t.step(), "a");

    // Missing x keeps the form on a.
    let t = StepForm::from_request(Arc::clone(&schema), &query("step=a&next=b"))?;
    assert_eq!(t.step(), "a");
    assert_eq!(t.messages_for("x")?, ["x is required"]);

    let t = StepForm::from_request(Arc::clone(&schema), &query("step=a&next=b&x=1"))?;
    assert_eq!((t.step(), t.seen()), ("b", Some("a")));

    // b has nothing to check, so asking for c moves on.
    let mut t = t;
    t.set_target("c")?;
    let t = StepForm::from_request(Arc::clone(&schema), &query(&t.query_string()))?;
    assert_eq!((t.step(), t.seen(), t.last()), ("c", Some("b"), Some("c")));
    assert_eq!(t.value("x")?.map(ToString::to_string), Some("1".to_string()));
    Ok(())
}

#[test]
fn test_three_step_walkthrough_with_required_middle_step() -> Result<()> {
    let schema = abc_schema(Some(FieldBuilder::new("y")));
    let t = StepForm::from_request(Arc::clone(&schema), &query("step=b&next=c&seen=a&last=b&x=1"))?;
    assert_eq!(t.step(), "b");
    assert_eq!(t.last(), Some("b"));
    assert!(t.is_incorrect_step("b")?);

    let t = StepForm::from_request(schema, &query("step=b&next=c&seen=a&last=b&x=1&y=2"))?;
    assert_eq!(t.step(), "c");
    Ok(())
}
