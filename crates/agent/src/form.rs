//! Conversational slot-filling form engine
//!
//! One [`ConversationalForm`] drives one booking conversation. Every turn
//! runs the same two phases: stateless extraction merges whatever the
//! message happens to contain into the unset fields, then the state
//! dispatch handles the one question currently on the table. Fields filled
//! opportunistically are skipped when their collection state comes up, so
//! "I'm John, call me at 555-123-4567" answers two questions at once while
//! the dialogue still never passes an unvalidated field.
//!
//! Everything that can go wrong here is session-scoped: validation
//! failures re-prompt, an exhausted retry budget aborts back to idle, and
//! a failed append keeps the session in the confirming state so the
//! collected data survives. Nothing escalates past the conversation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use chatdesk_config::{IntentsConfig, PromptsConfig};
use chatdesk_core::{AppointmentRecord, Clock, FormField, FormState, Turn, TurnRole, UserInfo};
use chatdesk_persistence::AppointmentStore;
use chatdesk_text_processing::{
    classify_confirmation, matches_appointment_intent, parse_field_mention, valid_date,
    valid_name, valid_phone, valid_time, Confirmation, EmailSyntaxChecker, ExtractedFields,
    FieldExtractor,
};

/// Mutable state of one booking conversation.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    pub state: FormState,
    pub user_info: UserInfo,
    pub retry_count: u32,
    /// Append-only audit trail; transitions never read it back.
    pub history: Vec<Turn>,
    /// Set after a negative confirmation while we wait to hear which field
    /// to change. The state stays `Confirming`.
    awaiting_edit_field: bool,
}

/// Structured outcome of one processed message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FormReply {
    pub response: String,
    pub state: FormState,
    /// Present only on the turn that completes a booking.
    pub appointment: Option<AppointmentRecord>,
}

/// The form engine. All collaborators are injected so tests can pin the
/// clock, stub the email check and observe the store.
pub struct ConversationalForm {
    session: FormSession,
    store: Arc<dyn AppointmentStore>,
    email_checker: Arc<dyn EmailSyntaxChecker>,
    clock: Arc<dyn Clock>,
    extractor: FieldExtractor,
    prompts: Arc<PromptsConfig>,
    intents: Arc<IntentsConfig>,
    max_retries: u32,
}

impl ConversationalForm {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        email_checker: Arc<dyn EmailSyntaxChecker>,
        clock: Arc<dyn Clock>,
        prompts: Arc<PromptsConfig>,
        intents: Arc<IntentsConfig>,
        max_retries: u32,
    ) -> Self {
        Self {
            session: FormSession::default(),
            store,
            email_checker,
            clock,
            extractor: FieldExtractor::new(),
            prompts,
            intents,
            max_retries,
        }
    }

    pub fn state(&self) -> FormState {
        self.session.state
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Clear the session back to a fresh idle state.
    pub fn reset(&mut self) {
        self.session = FormSession::default();
    }

    /// Process one user message and produce the reply for it.
    ///
    /// The clock is read once here; every date decision in this call uses
    /// the same "today".
    pub fn process_message(&mut self, message: &str) -> FormReply {
        let now = self.clock.now();
        let today = self.clock.today();

        self.session
            .history
            .push(Turn::new(TurnRole::User, message, now));

        let extracted = self.extractor.extract(message, today);
        self.merge_extracted(&extracted);

        let (response, appointment) = match self.session.state {
            FormState::Idle => (self.handle_idle(message, today), None),
            state if state.is_collecting() => (self.handle_collecting(message, today), None),
            FormState::Confirming => self.handle_confirming(message, &extracted, now, today),
            _ => (self.prompts.idle_offer.clone(), None),
        };

        self.session
            .history
            .push(Turn::new(TurnRole::Assistant, response.clone(), now));

        FormReply {
            response,
            state: self.session.state,
            appointment,
        }
    }

    /// Fill unset fields with this turn's extraction candidates. Set
    /// fields are never overwritten here; only a field's own collection
    /// step (or the edit path) is authoritative for it.
    fn merge_extracted(&mut self, extracted: &ExtractedFields) {
        let info = &mut self.session.user_info;
        if info.name.is_none() {
            info.name = extracted.name.clone();
        }
        if info.phone.is_none() {
            info.phone = extracted.phone.clone();
        }
        if info.email.is_none() {
            info.email = extracted.email.clone();
        }
        if info.appointment_date.is_none() {
            info.appointment_date = extracted.appointment_date.clone();
        }
        if info.appointment_time.is_none() {
            info.appointment_time = extracted.appointment_time.clone();
        }
    }

    fn handle_idle(&mut self, message: &str, today: NaiveDate) -> String {
        if matches_appointment_intent(message, &self.intents.appointment_keywords) {
            tracing::info!("Appointment intent detected, starting form");
            self.session.retry_count = 0;
            self.advance(today)
        } else {
            self.prompts.idle_offer.clone()
        }
    }

    fn handle_collecting(&mut self, message: &str, today: NaiveDate) -> String {
        let field = match collected_field(self.session.state) {
            Some(field) => field,
            None => return self.prompts.idle_offer.clone(),
        };

        // Extraction may miss a bare answer ("jane doe", "14:05"); the raw
        // message itself is the value for some fields.
        if !self.field_is_valid(field, today) {
            if let Some(value) = raw_fallback(field, message, today) {
                set_field(&mut self.session.user_info, field, value);
            }
        }

        if self.field_is_valid(field, today) {
            self.session.retry_count = 0;
            self.advance(today)
        } else {
            self.session.retry_count += 1;
            if self.session.retry_count >= self.max_retries {
                tracing::warn!(
                    state = %self.session.state,
                    retries = self.session.retry_count,
                    "Retry budget exhausted, aborting session"
                );
                self.reset();
                self.prompts.abort.clone()
            } else {
                self.invalid_prompt(field).to_string()
            }
        }
    }

    fn handle_confirming(
        &mut self,
        message: &str,
        extracted: &ExtractedFields,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> (String, Option<AppointmentRecord>) {
        if self.session.awaiting_edit_field {
            return (self.handle_edit(message, extracted, today), None);
        }

        match classify_confirmation(
            message,
            &self.intents.affirmative_tokens,
            &self.intents.negative_tokens,
        ) {
            Confirmation::Affirmative => self.commit_booking(now),
            Confirmation::Negative => {
                self.session.awaiting_edit_field = true;
                (self.prompts.edit_ask.clone(), None)
            }
            // Field aliases only count as an edit request after an explicit
            // "no"; a clarifying question here must not touch collected data.
            Confirmation::Other => (self.prompts.confirm_reask.clone(), None),
        }
    }

    /// Jump back to the collection state of the field the user wants to
    /// change, keeping everything else. An inline replacement value
    /// ("change my email to new@example.com") is applied immediately and
    /// returns the dialogue straight to the summary.
    fn handle_edit(&mut self, message: &str, extracted: &ExtractedFields, today: NaiveDate) -> String {
        let field = match parse_field_mention(message) {
            Some(field) => field,
            None => return self.prompts.edit_unknown.clone(),
        };

        self.session.awaiting_edit_field = false;
        self.session.retry_count = 0;
        clear_field(&mut self.session.user_info, field);
        self.session.state = collecting_state(field);

        if let Some(value) = extracted_value(extracted, field) {
            set_field(&mut self.session.user_info, field, value);
        }
        if self.field_is_valid(field, today) {
            self.advance(today)
        } else {
            self.ask_prompt(field)
        }
    }

    fn commit_booking(&mut self, now: DateTime<Utc>) -> (String, Option<AppointmentRecord>) {
        let record = match AppointmentRecord::from_user_info(&self.session.user_info, now) {
            Some(record) => record,
            None => {
                // Unreachable by construction; recover by starting over.
                tracing::error!("Confirming state reached with incomplete user info");
                self.reset();
                return (self.prompts.abort.clone(), None);
            }
        };

        match self.store.append(&record) {
            Ok(()) => {
                self.session.state = FormState::Completed;
                let response = PromptsConfig::render(
                    &self.prompts.completed,
                    &[
                        ("name", &record.name),
                        ("phone", &record.phone),
                        ("email", &record.email),
                    ],
                );
                (response, Some(record))
            }
            Err(e) => {
                // Stay in Confirming; the collected data survives and an
                // affirmative reply retries the append.
                tracing::error!(error = %e, "Failed to persist appointment");
                (self.prompts.booking_failed.clone(), None)
            }
        }
    }

    /// Advance past every already-satisfied collection state, stopping at
    /// the first unset field's question or at the confirmation summary.
    fn advance(&mut self, today: NaiveDate) -> String {
        loop {
            self.session.state = self.session.state.next();
            match collected_field(self.session.state) {
                Some(field) if self.field_is_valid(field, today) => continue,
                Some(field) => return self.ask_prompt(field),
                None => return self.confirmation_summary(),
            }
        }
    }

    /// The field is set and passes its validator right now. Date validity
    /// is re-checked against today, so a date collected earlier can go
    /// stale and be re-asked.
    fn field_is_valid(&self, field: FormField, today: NaiveDate) -> bool {
        let info = &self.session.user_info;
        match field {
            FormField::Name => info.name.as_deref().is_some_and(valid_name),
            FormField::Phone => info.phone.as_deref().is_some_and(valid_phone),
            FormField::Email => info
                .email
                .as_deref()
                .is_some_and(|e| self.email_checker.is_valid(e)),
            FormField::Date => info
                .appointment_date
                .as_deref()
                .is_some_and(|d| valid_date(d, today)),
            FormField::Time => info.appointment_time.as_deref().is_some_and(valid_time),
            FormField::Reason => info
                .reason
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty()),
        }
    }

    fn ask_prompt(&self, field: FormField) -> String {
        let info = &self.session.user_info;
        match field {
            FormField::Name => self.prompts.ask_name.clone(),
            FormField::Phone => PromptsConfig::render(
                &self.prompts.ask_phone,
                &[("name", info.name.as_deref().unwrap_or(""))],
            ),
            FormField::Email => self.prompts.ask_email.clone(),
            FormField::Date => self.prompts.ask_date.clone(),
            FormField::Time => {
                let date = info
                    .appointment_date
                    .as_deref()
                    .map(humanize_date)
                    .unwrap_or_default();
                PromptsConfig::render(&self.prompts.ask_time, &[("date", &date)])
            }
            FormField::Reason => self.prompts.ask_reason.clone(),
        }
    }

    fn invalid_prompt(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.prompts.invalid_name,
            FormField::Phone => &self.prompts.invalid_phone,
            FormField::Email => &self.prompts.invalid_email,
            FormField::Date => &self.prompts.invalid_date,
            FormField::Time => &self.prompts.invalid_time,
            FormField::Reason => &self.prompts.invalid_reason,
        }
    }

    fn confirmation_summary(&self) -> String {
        let info = &self.session.user_info;
        let date = info
            .appointment_date
            .as_deref()
            .map(humanize_date)
            .unwrap_or_default();
        let time = info
            .appointment_time
            .as_deref()
            .map(humanize_time)
            .unwrap_or_default();
        PromptsConfig::render(
            &self.prompts.confirm_summary,
            &[
                ("name", info.name.as_deref().unwrap_or("")),
                ("phone", info.phone.as_deref().unwrap_or("")),
                ("email", info.email.as_deref().unwrap_or("")),
                ("date", &date),
                ("time", &time),
                ("reason", info.reason.as_deref().unwrap_or("")),
            ],
        )
    }
}

/// The field a collecting state is asking for.
fn collected_field(state: FormState) -> Option<FormField> {
    match state {
        FormState::CollectingName => Some(FormField::Name),
        FormState::CollectingPhone => Some(FormField::Phone),
        FormState::CollectingEmail => Some(FormField::Email),
        FormState::CollectingDate => Some(FormField::Date),
        FormState::CollectingTime => Some(FormField::Time),
        FormState::CollectingReason => Some(FormField::Reason),
        _ => None,
    }
}

fn collecting_state(field: FormField) -> FormState {
    match field {
        FormField::Name => FormState::CollectingName,
        FormField::Phone => FormState::CollectingPhone,
        FormField::Email => FormState::CollectingEmail,
        FormField::Date => FormState::CollectingDate,
        FormField::Time => FormState::CollectingTime,
        FormField::Reason => FormState::CollectingReason,
    }
}

fn set_field(info: &mut UserInfo, field: FormField, value: String) {
    match field {
        FormField::Name => info.name = Some(value),
        FormField::Phone => info.phone = Some(value),
        FormField::Email => info.email = Some(value),
        FormField::Date => info.appointment_date = Some(value),
        FormField::Time => info.appointment_time = Some(value),
        FormField::Reason => info.reason = Some(value),
    }
}

fn clear_field(info: &mut UserInfo, field: FormField) {
    match field {
        FormField::Name => info.name = None,
        FormField::Phone => info.phone = None,
        FormField::Email => info.email = None,
        FormField::Date => info.appointment_date = None,
        FormField::Time => info.appointment_time = None,
        FormField::Reason => info.reason = None,
    }
}

fn extracted_value(extracted: &ExtractedFields, field: FormField) -> Option<String> {
    match field {
        FormField::Name => extracted.name.clone(),
        FormField::Phone => extracted.phone.clone(),
        FormField::Email => extracted.email.clone(),
        FormField::Date => extracted.appointment_date.clone(),
        FormField::Time => extracted.appointment_time.clone(),
        FormField::Reason => None,
    }
}

/// When the whole message is the answer: a bare name, an ISO date, a
/// 24-hour time, or (for the reason) any non-empty text.
fn raw_fallback(field: FormField, message: &str, today: NaiveDate) -> Option<String> {
    let trimmed = message.trim();
    match field {
        FormField::Name => valid_name(trimmed).then(|| trimmed.to_string()),
        FormField::Date => valid_date(trimmed, today).then(|| trimmed.to_string()),
        FormField::Time => valid_time(trimmed).then(|| trimmed.to_string()),
        FormField::Reason => (!trimmed.is_empty()).then(|| trimmed.to_string()),
        FormField::Phone | FormField::Email => None,
    }
}

/// `2024-06-11` -> `Tuesday, June 11, 2024`
fn humanize_date(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%A, %B %-d, %Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

/// `14:30` -> `2:30 PM`
fn humanize_time(hhmm: &str) -> String {
    match NaiveTime::parse_from_str(hhmm, "%H:%M") {
        Ok(time) => time.format("%-I:%M %p").to_string(),
        Err(_) => hhmm.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_core::FixedClock;
    use chatdesk_persistence::MemoryAppointmentStore;
    use chatdesk_text_processing::RegexEmailChecker;

    // Monday
    const TODAY: (i32, u32, u32) = (2024, 6, 10);

    fn form_with_store() -> (ConversationalForm, Arc<MemoryAppointmentStore>) {
        let store = Arc::new(MemoryAppointmentStore::new());
        let date = NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap();
        let form = ConversationalForm::new(
            store.clone(),
            Arc::new(RegexEmailChecker),
            Arc::new(FixedClock::new(date)),
            Arc::new(PromptsConfig::default()),
            Arc::new(IntentsConfig::default()),
            3,
        );
        (form, store)
    }

    fn form() -> ConversationalForm {
        form_with_store().0
    }

    #[test]
    fn test_idle_without_intent_stays_idle() {
        let mut form = form();
        let reply = form.process_message("what services do you offer?");
        assert_eq!(reply.state, FormState::Idle);
        assert!(reply.appointment.is_none());
    }

    #[test]
    fn test_intent_starts_collection() {
        let mut form = form();
        let reply = form.process_message("call me back");
        assert_eq!(reply.state, FormState::CollectingName);
        assert_eq!(form.session().retry_count, 0);
    }

    #[test]
    fn test_bare_lowercase_name_uses_raw_fallback() {
        let mut form = form();
        form.process_message("call me back");
        let reply = form.process_message("jane doe");
        assert_eq!(reply.state, FormState::CollectingPhone);
        assert_eq!(form.session().user_info.name.as_deref(), Some("jane doe"));
    }

    #[test]
    fn test_invalid_email_increments_retry_only() {
        let mut form = form();
        form.process_message("call me back");
        form.process_message("Jane Doe");
        form.process_message("+14155552671");
        let reply = form.process_message("not-an-email");
        assert_eq!(reply.state, FormState::CollectingEmail);
        assert_eq!(form.session().retry_count, 1);
    }

    #[test]
    fn test_retry_budget_aborts_from_any_collecting_state() {
        let prefixes: &[&[&str]] = &[
            &["call me back"],
            &["call me back", "Jane Doe"],
            &["call me back", "Jane Doe", "+14155552671"],
            &["call me back", "Jane Doe", "+14155552671", "jane@example.com"],
            &["call me back", "Jane Doe", "+14155552671", "jane@example.com", "tomorrow"],
        ];
        for prefix in prefixes {
            let mut form = form();
            for msg in *prefix {
                form.process_message(msg);
            }
            let collecting = form.state();
            assert!(collecting.is_collecting());

            form.process_message("??");
            form.process_message("??");
            let reply = form.process_message("??");
            assert_eq!(reply.state, FormState::Idle, "aborting from {collecting}");
            assert_eq!(form.session().retry_count, 0);
            assert_eq!(form.session().user_info, UserInfo::default());
        }
    }

    #[test]
    fn test_multi_field_turn_skips_answered_questions() {
        let mut form = form();
        let reply = form.process_message("Please call me back, I'm John, my number is 555-123-4567");
        // Name and phone arrived with the intent; the next question is email.
        assert_eq!(reply.state, FormState::CollectingEmail);
        assert_eq!(form.session().user_info.name.as_deref(), Some("John"));
        assert_eq!(form.session().user_info.phone.as_deref(), Some("5551234567"));
    }

    #[test]
    fn test_merge_never_overwrites_set_field() {
        let mut form = form();
        form.process_message("call me back");
        form.process_message("Jane Doe");
        form.process_message("my name is Bob, anyway the number is +14155552671");
        assert_eq!(form.session().user_info.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_full_flow_books_appointment() {
        let (mut form, store) = form_with_store();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
        ] {
            form.process_message(msg);
        }
        assert_eq!(form.state(), FormState::Confirming);

        let reply = form.process_message("yes");
        assert_eq!(reply.state, FormState::Completed);
        let record = reply.appointment.unwrap();
        assert_eq!(record.appointment_date, "2024-06-11");
        assert_eq!(record.appointment_time, "14:30");
        assert_eq!(record.status.as_str(), "confirmed");
        assert_eq!(store.scan(&|_| true).unwrap().len(), 1);
    }

    #[test]
    fn test_confirmation_summary_humanizes_date_and_time() {
        let mut form = form();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
        ] {
            form.process_message(msg);
        }
        let reply = form.process_message("discuss pricing");
        assert!(reply.response.contains("Tuesday, June 11, 2024"));
        assert!(reply.response.contains("2:30 PM"));
    }

    #[test]
    fn test_persistence_failure_keeps_confirming() {
        let (mut form, store) = form_with_store();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
        ] {
            form.process_message(msg);
        }
        store.set_fail_appends(true);
        let reply = form.process_message("yes");
        assert_eq!(reply.state, FormState::Confirming);
        assert!(reply.appointment.is_none());
        assert!(form.session().user_info.is_complete());

        // Retrying after the store recovers succeeds.
        store.set_fail_appends(false);
        let reply = form.process_message("yes");
        assert_eq!(reply.state, FormState::Completed);
        assert!(reply.appointment.is_some());
    }

    #[test]
    fn test_negative_confirmation_edits_one_field() {
        let mut form = form();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
        ] {
            form.process_message(msg);
        }

        let reply = form.process_message("no");
        assert_eq!(reply.state, FormState::Confirming);

        let reply = form.process_message("the email");
        assert_eq!(reply.state, FormState::CollectingEmail);
        assert!(form.session().user_info.email.is_none());

        // New value flows back to the summary with everything else intact.
        let reply = form.process_message("jane.doe@example.com");
        assert_eq!(reply.state, FormState::Confirming);
        assert_eq!(form.session().user_info.name.as_deref(), Some("Jane Doe"));

        let reply = form.process_message("yes");
        assert_eq!(reply.state, FormState::Completed);
        assert_eq!(
            reply.appointment.unwrap().email,
            "jane.doe@example.com".to_string()
        );
    }

    #[test]
    fn test_inline_edit_value_returns_to_summary() {
        let mut form = form();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
            "no",
        ] {
            form.process_message(msg);
        }
        let reply = form.process_message("change my email to jane.doe@example.com");
        assert_eq!(reply.state, FormState::Confirming);
        assert_eq!(
            form.session().user_info.email.as_deref(),
            Some("jane.doe@example.com")
        );
    }

    #[test]
    fn test_unclear_confirmation_reasks() {
        let mut form = form();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
        ] {
            form.process_message(msg);
        }
        let reply = form.process_message("hmm maybe");
        assert_eq!(reply.state, FormState::Confirming);
        assert!(reply.appointment.is_none());
    }

    #[test]
    fn test_clarifying_question_at_confirming_keeps_data() {
        let mut form = form();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
        ] {
            form.process_message(msg);
        }

        // Mentions "time" but is neither a yes nor a no: re-ask, don't edit.
        let reply = form.process_message("will you confirm at that time?");
        assert_eq!(reply.state, FormState::Confirming);
        assert_eq!(
            form.session().user_info.appointment_time.as_deref(),
            Some("14:30")
        );

        let reply = form.process_message("yes");
        assert_eq!(reply.state, FormState::Completed);
        assert_eq!(reply.appointment.unwrap().appointment_time, "14:30");
    }

    #[test]
    fn test_completed_is_inert_until_reset() {
        let mut form = form();
        for msg in [
            "call me back",
            "Jane Doe",
            "+14155552671",
            "jane@example.com",
            "tomorrow",
            "2:30 pm",
            "discuss pricing",
            "yes",
        ] {
            form.process_message(msg);
        }
        let reply = form.process_message("call me back");
        assert_eq!(reply.state, FormState::Completed);

        form.reset();
        assert_eq!(form.state(), FormState::Idle);
        let reply = form.process_message("call me back");
        assert_eq!(reply.state, FormState::CollectingName);
    }

    #[test]
    fn test_history_records_both_sides() {
        let mut form = form();
        form.process_message("call me back");
        form.process_message("Jane Doe");
        let history = &form.session().history;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, TurnRole::User);
        assert_eq!(history[1].role, TurnRole::Assistant);
    }
}
