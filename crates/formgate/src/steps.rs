//! Multi-step forms.
//!
//! A schema defined with [`crate::SchemaBuilder::steps`] splits its fields into
//! ordered stages: a field belongs to a step when it is tagged with the step's
//! key. Progress is carried in four synthetic fields:
//!
//! - `step`: the current step;
//! - `next`: the step the client asks to move to;
//! - `seen`: the furthest step whose fields were checked;
//! - `last`: the furthest step ever made accessible.
//!
//! [`StepForm`] derives the new state from the posted one on construction and
//! only moves to `next` when every field of the current step is valid. Posted
//! values that are not step keys are dropped during import.

use crate::error::{FormError, Result};
use crate::field::Field;
use crate::form::Form;
use crate::request::Request;
use crate::schema::Schema;
use crate::value::Value;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;

/// A [`Form`] over a schema with steps, with the step transition applied.
#[derive(Debug, Clone)]
pub struct StepForm {
    form: Form,
}

impl StepForm {
    /// Fresh form positioned at the first step.
    pub fn new(schema: Arc<Schema>) -> Result<Self> {
        Self::from_form(Form::new(schema))
    }

    /// Form for a posted request: the step state is taken from the request and
    /// advanced if the current step validates.
    pub fn from_request(schema: Arc<Schema>, request: &impl Request) -> Result<Self> {
        Self::from_form(Form::from_request(schema, request))
    }

    pub fn from_record<K: AsRef<str>>(
        schema: Arc<Schema>,
        record: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Self> {
        Self::from_form(Form::from_record(schema, record)?)
    }

    /// Apply the step transition to an already populated form.
    pub fn from_form(form: Form) -> Result<Self> {
        if !form.schema().has_steps() {
            return Err(FormError::NoSteps(form.schema().name().to_string()));
        }
        let mut this = Self { form };
        this.transition()?;
        Ok(this)
    }

    fn transition(&mut self) -> Result<()> {
        let posted = self.state("step").map(str::to_string);

        let seen = self.last_step_of(&[self.seen(), posted.as_deref()])?.map(str::to_string);
        self.store("seen", seen)?;

        let step = posted.unwrap_or_else(|| self.first_step().to_string());
        self.store("step", Some(step.clone()))?;
        if self.target().is_none() {
            self.store("next", Some(step.clone()))?;
        }
        if self.last().is_none() {
            self.store("last", Some(step.clone()))?;
        }

        let mut current = step.clone();
        if self.is_correct_step(&step)? {
            current = self.target().unwrap_or(&step).to_string();
            let previous = self.previous_step(Some(&current)).map(str::to_string);
            let seen = self
                .last_step_of(&[self.seen(), previous.as_deref()])?
                .map(str::to_string);
            self.store("step", Some(current.clone()))?;
            self.store("seen", seen)?;
        }

        let last = self
            .last_step_of(&[Some(current.as_str()), self.last()])?
            .map(str::to_string);
        self.store("last", last)?;

        debug!(
            schema = self.form.schema().name(),
            from = %step,
            to = %current,
            seen = self.seen().unwrap_or(""),
            last = self.last().unwrap_or(""),
            "step transition"
        );
        Ok(())
    }

    fn store(&mut self, name: &str, step: Option<String>) -> Result<()> {
        match step {
            Some(step) => self.form.set(name, step)?,
            None => self.form.unset(name)?,
        };
        Ok(())
    }

    /// A step state field, if it holds a valid step key.
    fn state(&self, name: &str) -> Option<&str> {
        let value = self.form.value(name).ok()??.as_str()?;
        self.steps().contains(&value).then_some(value)
    }

    /// Make every step accessible at once, e.g. when editing complete data.
    pub fn unlock_steps(&mut self) -> Result<&mut Self> {
        let last = self.last_step().to_string();
        self.store("last", Some(last.clone()))?;
        self.store("seen", Some(last))?;
        Ok(self)
    }

    pub fn into_form(self) -> Form {
        self.form
    }

    /// Copy without validation results, keeping the step state as is.
    pub fn duplicate(&self) -> Self {
        Self {
            form: self.form.duplicate(),
        }
    }

    // State.

    /// The current step.
    pub fn step(&self) -> &str {
        self.state("step").unwrap_or_else(|| self.first_step())
    }

    /// The step the client asked to move to.
    pub fn target(&self) -> Option<&str> {
        self.state("next")
    }

    /// The furthest step whose fields were checked.
    pub fn seen(&self) -> Option<&str> {
        self.state("seen")
    }

    /// The furthest step made accessible so far.
    pub fn last(&self) -> Option<&str> {
        self.state("last")
    }

    pub fn set_step(&mut self, step: &str) -> Result<&mut Self> {
        self.step_index(step)?;
        self.form.set("step", step)?;
        Ok(self)
    }

    /// Set the step to move to on the next submission.
    pub fn set_target(&mut self, step: &str) -> Result<&mut Self> {
        self.step_index(step)?;
        self.form.set("next", step)?;
        Ok(self)
    }

    // Step table.

    /// All steps with their display names; extra steps have none.
    pub fn form_steps(&self) -> &[(String, Option<String>)] {
        self.form.schema().steps().unwrap_or(&[])
    }

    pub fn steps(&self) -> Vec<&str> {
        self.form_steps().iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Display name of a step; `None` for extra steps and unknown names.
    pub fn step_name(&self, step: Option<&str>) -> Option<&str> {
        let step = step?;
        self.form_steps()
            .iter()
            .find(|(k, _)| k == step)
            .and_then(|(_, name)| name.as_deref())
    }

    pub fn current_step_name(&self) -> Option<&str> {
        self.step_name(Some(self.step()))
    }

    /// Steps with display names, for a sidebar.
    pub fn step_names(&self) -> Vec<(&str, &str)> {
        self.form_steps()
            .iter()
            .filter_map(|(k, name)| name.as_deref().map(|n| (k.as_str(), n)))
            .collect()
    }

    pub fn step_index(&self, step: &str) -> Result<usize> {
        self.steps()
            .iter()
            .position(|s| *s == step)
            .ok_or_else(|| FormError::InvalidStep(step.to_string()))
    }

    fn index_of(&self, step: Option<&str>) -> Option<usize> {
        step.and_then(|s| self.steps().iter().position(|x| *x == s))
    }

    pub fn first_step(&self) -> &str {
        self.form_steps().first().map_or("", |(k, _)| k.as_str())
    }

    pub fn last_step(&self) -> &str {
        self.form_steps().last().map_or("", |(k, _)| k.as_str())
    }

    /// Earliest of the given steps, ignoring `None`s.
    pub fn first_step_of<'s>(&self, among: &[Option<&'s str>]) -> Result<Option<&'s str>> {
        let mut best: Option<(usize, &'s str)> = None;
        for step in among.iter().flatten() {
            let index = self.step_index(step)?;
            if best.map_or(true, |(b, _)| index < b) {
                best = Some((index, *step));
            }
        }
        Ok(best.map(|(_, s)| s))
    }

    /// Latest of the given steps, ignoring `None`s.
    pub fn last_step_of<'s>(&self, among: &[Option<&'s str>]) -> Result<Option<&'s str>> {
        let mut best: Option<(usize, &'s str)> = None;
        for step in among.iter().flatten() {
            let index = self.step_index(step)?;
            if best.map_or(true, |(b, _)| index > b) {
                best = Some((index, *step));
            }
        }
        Ok(best.map(|(_, s)| s))
    }

    pub fn is_first_step(&self, step: Option<&str>) -> bool {
        step.is_some_and(|s| s == self.first_step())
    }

    pub fn is_last_step(&self, step: Option<&str>) -> bool {
        step.is_some_and(|s| s == self.last_step())
    }

    /// Steps before the given one; none for unknown steps.
    pub fn previous_steps(&self, step: Option<&str>) -> Vec<&str> {
        let index = self.index_of(step).unwrap_or(0);
        let mut steps = self.steps();
        steps.truncate(index);
        steps
    }

    /// Steps after the given one; all of them for unknown steps.
    pub fn next_steps(&self, step: Option<&str>) -> Vec<&str> {
        let start = self.index_of(step).map_or(0, |i| i + 1);
        self.steps().split_off(start)
    }

    pub fn previous_step(&self, step: Option<&str>) -> Option<&str> {
        self.previous_steps(step).last().copied()
    }

    pub fn next_step(&self, step: Option<&str>) -> Option<&str> {
        self.next_steps(step).first().copied()
    }

    pub fn previous_step_name(&self) -> Option<&str> {
        self.step_name(self.previous_step(Some(self.step())))
    }

    pub fn next_step_name(&self) -> Option<&str> {
        self.step_name(self.next_step(Some(self.step())))
    }

    /// Whether the current step comes before `step`.
    pub fn step_before(&self, step: &str) -> Result<bool> {
        Ok(self.step_index(self.step())? < self.step_index(step)?)
    }

    /// Whether the current step comes after `step`.
    pub fn step_after(&self, step: &str) -> Result<bool> {
        Ok(self.step_index(self.step())? > self.step_index(step)?)
    }

    // Step fields.

    /// Fields belonging to the given step.
    pub fn step_fields(&self, step: &str) -> Result<Vec<Field<'_>>> {
        self.step_index(step)?;
        Ok(self.form.tagged_fields(&[step]))
    }

    pub fn current_fields(&self) -> Vec<Field<'_>> {
        self.form.tagged_fields(&[self.step()])
    }

    pub fn other_fields(&self) -> Vec<Field<'_>> {
        self.form.untagged_fields(&[self.step()])
    }

    /// Steps with fields, whose fields satisfy `pred`.
    fn filter_steps(&self, pred: impl Fn(&[Field<'_>]) -> bool) -> Vec<&str> {
        self.steps()
            .into_iter()
            .filter(|step| {
                let fields = self.form.tagged_fields(&[*step]);
                !fields.is_empty() && pred(&fields)
            })
            .collect()
    }

    /// A step without fields.
    pub fn is_extra_step(&self, step: &str) -> Result<bool> {
        Ok(self.step_fields(step)?.is_empty())
    }

    pub fn is_regular_step(&self, step: &str) -> Result<bool> {
        Ok(!self.is_extra_step(step)?)
    }

    pub fn extra_steps(&self) -> Vec<&str> {
        self.steps()
            .into_iter()
            .filter(|step| self.form.tagged_fields(&[*step]).is_empty())
            .collect()
    }

    pub fn regular_steps(&self) -> Vec<&str> {
        self.filter_steps(|_| true)
    }

    pub fn is_required_step(&self, step: &str) -> Result<bool> {
        Ok(self.step_fields(step)?.iter().any(Field::required))
    }

    pub fn is_optional_step(&self, step: &str) -> Result<bool> {
        Ok(!self.is_required_step(step)?)
    }

    pub fn required_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| fields.iter().any(Field::required))
    }

    pub fn optional_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| !fields.iter().any(Field::required))
    }

    /// Some field of the step is filled. True for extra steps.
    pub fn is_filled_step(&self, step: &str) -> Result<bool> {
        let fields = self.step_fields(step)?;
        Ok(fields.is_empty() || fields.iter().any(Field::filled))
    }

    pub fn is_unfilled_step(&self, step: &str) -> Result<bool> {
        Ok(!self.is_filled_step(step)?)
    }

    pub fn filled_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| fields.iter().any(Field::filled))
    }

    pub fn unfilled_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| !fields.iter().any(Field::filled))
    }

    /// All fields of the step are valid. True for extra steps.
    pub fn is_correct_step(&self, step: &str) -> Result<bool> {
        Ok(self.step_fields(step)?.iter().all(Field::valid))
    }

    pub fn is_incorrect_step(&self, step: &str) -> Result<bool> {
        Ok(!self.is_correct_step(step)?)
    }

    pub fn correct_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| fields.iter().all(Field::valid))
    }

    pub fn incorrect_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| !fields.iter().all(Field::valid))
    }

    /// The first step with invalid data.
    pub fn incorrect_step(&self) -> Option<&str> {
        self.incorrect_steps().first().copied()
    }

    /// Some field of the step is enabled. True for extra steps.
    pub fn is_enabled_step(&self, step: &str) -> Result<bool> {
        let fields = self.step_fields(step)?;
        Ok(fields.is_empty() || fields.iter().any(Field::enabled))
    }

    pub fn is_disabled_step(&self, step: &str) -> Result<bool> {
        Ok(!self.is_enabled_step(step)?)
    }

    pub fn enabled_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| fields.iter().any(Field::enabled))
    }

    pub fn disabled_steps(&self) -> Vec<&str> {
        self.filter_steps(|fields| fields.iter().all(Field::disabled))
    }

    // Progress.

    /// Steps not visited yet, or visited for the first time.
    pub fn unfinished_steps(&self) -> Vec<&str> {
        self.next_steps(self.seen())
    }

    /// Steps visited or skipped over before.
    pub fn finished_steps(&self) -> Vec<&str> {
        let unfinished = self.unfinished_steps();
        self.steps()
            .into_iter()
            .filter(|s| !unfinished.contains(s))
            .collect()
    }

    /// Steps not reachable yet.
    pub fn inaccessible_steps(&self) -> Vec<&str> {
        self.next_steps(self.last())
    }

    /// Steps reachable for navigation, up to and including `last`.
    pub fn accessible_steps(&self) -> Vec<&str> {
        let inaccessible = self.inaccessible_steps();
        self.steps()
            .into_iter()
            .filter(|s| !inaccessible.contains(s))
            .collect()
    }

    /// Finished steps with valid data, extra steps included.
    pub fn complete_steps(&self) -> Vec<&str> {
        self.finished_steps()
            .into_iter()
            .filter(|s| self.is_correct_step(s).unwrap_or(false))
            .collect()
    }

    /// Finished steps with invalid data.
    pub fn incomplete_steps(&self) -> Vec<&str> {
        self.finished_steps()
            .into_iter()
            .filter(|s| self.is_incorrect_step(s).unwrap_or(false))
            .collect()
    }

    /// Complete steps with some data filled in, to be checked off as done.
    pub fn good_steps(&self) -> Vec<&str> {
        let filled = self.filled_steps();
        self.complete_steps()
            .into_iter()
            .filter(|s| filled.contains(s))
            .collect()
    }

    /// Steps to be marked as having errors.
    pub fn bad_steps(&self) -> Vec<&str> {
        self.incomplete_steps()
    }

    fn member(&self, step: &str, list: Vec<&str>) -> Result<bool> {
        self.step_index(step)?;
        Ok(list.contains(&step))
    }

    pub fn is_finished_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.finished_steps())
    }

    pub fn is_unfinished_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.unfinished_steps())
    }

    pub fn is_accessible_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.accessible_steps())
    }

    pub fn is_inaccessible_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.inaccessible_steps())
    }

    pub fn is_complete_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.complete_steps())
    }

    pub fn is_incomplete_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.incomplete_steps())
    }

    pub fn is_good_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.good_steps())
    }

    pub fn is_bad_step(&self, step: &str) -> Result<bool> {
        self.member(step, self.bad_steps())
    }
}

impl Deref for StepForm {
    type Target = Form;

    fn deref(&self) -> &Form {
        &self.form
    }
}

impl DerefMut for StepForm {
    fn deref_mut(&mut self) -> &mut Form {
        &mut self.form
    }
}
