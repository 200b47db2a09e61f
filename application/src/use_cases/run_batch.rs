//! Run Batch use case
//!
//! Creates leads sequentially, one ordinal at a time. Each ordinal gets a
//! bounded number of attempts; the first success is appended to the audit
//! log before the next ordinal starts. When an ordinal runs out of
//! attempts the batch aborts and later ordinals are left for the next run.

use crate::config::BatchParams;
use crate::context::RunContext;
use crate::ports::audit_log::AuditLog;
use crate::ports::lead_transaction::{AttemptFailure, LeadTransaction};
use crate::ports::progress::{BatchProgressNotifier, NoProgress};
use crate::ports::resume_store::{ResumeCheckpoint, ResumeStore, StoreError};
use chrono::NaiveDate;
use leadforge_domain::{AttemptState, LeadAttempts, LeadRecord, ValidationErrors};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that end a batch early
#[derive(Error, Debug)]
pub enum RunBatchError {
    /// The run state broke an invariant; nothing was attempted
    #[error("Invalid run parameters: {0}")]
    Validation(ValidationErrors),

    /// An ordinal failed every attempt; the batch stopped there
    #[error("Lead #{ordinal} failed after {attempts} attempts: {last_failure}")]
    ExhaustedAfterRetries {
        ordinal: u32,
        attempts: u32,
        last_failure: AttemptFailure,
        summary: Box<BatchSummary>,
    },

    /// Every lead was created but the resume cursor could not be saved
    #[error("Resume position could not be saved: {source}")]
    Persist {
        source: StoreError,
        summary: Box<BatchSummary>,
    },
}

impl RunBatchError {
    /// Summary of what happened before the error, when the batch started
    pub fn summary(&self) -> Option<&BatchSummary> {
        match self {
            RunBatchError::Validation(_) => None,
            RunBatchError::ExhaustedAfterRetries { summary, .. }
            | RunBatchError::Persist { summary, .. } => Some(summary),
        }
    }
}

/// What a batch accomplished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub first_ordinal: u32,
    pub requested: u32,
    /// Ordinal to resume after; `first_ordinal - 1` when nothing succeeded
    pub last_successful_ordinal: u32,
    pub run_date: NaiveDate,
    pub records: Vec<LeadRecord>,
    pub completed: bool,
    /// Records that could not be written to the audit log
    pub audit_failures: u32,
    /// Final location of the audit report, once finalized
    pub report_path: Option<PathBuf>,
    /// Whether the final resume cursor reached durable storage
    pub persisted: bool,
}

impl BatchSummary {
    fn new(context: &RunContext) -> Self {
        let state = &context.run_state;
        Self {
            first_ordinal: state.resume_index,
            requested: state.lead_count,
            last_successful_ordinal: state.last_successful_before_run(),
            run_date: state.epoch_date,
            records: Vec::new(),
            completed: false,
            audit_failures: 0,
            report_path: None,
            persisted: false,
        }
    }

    pub fn created(&self) -> u32 {
        self.records.len() as u32
    }

    fn checkpoint(&self) -> ResumeCheckpoint {
        ResumeCheckpoint {
            last_processed_index: self.last_successful_ordinal,
            run_date: self.run_date,
        }
    }
}

/// An ordinal that used up all of its attempts
struct Exhausted {
    ordinal: u32,
    attempts: u32,
    last_failure: AttemptFailure,
}

/// Use case for running one batch of lead creations
pub struct RunBatchUseCase<T: LeadTransaction + 'static> {
    transaction: Arc<T>,
    params: BatchParams,
}

impl<T: LeadTransaction + 'static> RunBatchUseCase<T> {
    pub fn new(transaction: Arc<T>) -> Self {
        Self {
            transaction,
            params: BatchParams::default(),
        }
    }

    pub fn with_params(mut self, params: BatchParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &BatchParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        context: &RunContext,
        audit: &dyn AuditLog,
        store: &dyn ResumeStore,
    ) -> Result<BatchSummary, RunBatchError> {
        self.execute_with_progress(context, audit, store, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// The last successful ordinal and the run's epoch date are written to
    /// `store` before this returns, on every path past validation.
    pub async fn execute_with_progress(
        &self,
        context: &RunContext,
        audit: &dyn AuditLog,
        store: &dyn ResumeStore,
        progress: &dyn BatchProgressNotifier,
    ) -> Result<BatchSummary, RunBatchError> {
        context
            .run_state
            .validate()
            .map_err(RunBatchError::Validation)?;

        let state = &context.run_state;
        let mut summary = BatchSummary::new(context);

        info!(
            "Starting batch of {} {} leads at #{} ({}, {})",
            state.lead_count,
            state.customer_type,
            state.resume_index,
            state.environment,
            state.city_code
        );
        progress.on_batch_start(state.resume_index, state.lead_count);

        let mut ordinal = state.resume_index;
        let mut exhausted = None;

        while summary.created() < state.lead_count {
            match self.run_ordinal(ordinal, context, progress).await {
                Ok(record) => {
                    self.record_success(record, &mut summary, audit, store, progress);
                    ordinal += 1;
                }
                Err(failed) => {
                    error!(
                        "Lead #{} failed after {} attempts, stopping batch: {}",
                        failed.ordinal, failed.attempts, failed.last_failure
                    );
                    exhausted = Some(failed);
                    break;
                }
            }
        }

        summary.completed = exhausted.is_none();

        let persisted = store.persist(&summary.checkpoint());
        match &persisted {
            Ok(()) => {
                summary.persisted = true;
                info!(
                    "Saved resume position #{} ({})",
                    summary.last_successful_ordinal, summary.run_date
                );
            }
            Err(e) => error!("Failed to save resume position: {}", e),
        }

        match audit.finalize(&summary) {
            Ok(path) => {
                info!("Audit report: {}", path.display());
                summary.report_path = Some(path);
            }
            Err(e) => warn!("Audit report left unfinalized: {}", e),
        }

        progress.on_batch_complete(&summary);

        if let Some(failed) = exhausted {
            return Err(RunBatchError::ExhaustedAfterRetries {
                ordinal: failed.ordinal,
                attempts: failed.attempts,
                last_failure: failed.last_failure,
                summary: Box::new(summary),
            });
        }

        match persisted {
            Ok(()) => Ok(summary),
            Err(source) => Err(RunBatchError::Persist {
                source,
                summary: Box::new(summary),
            }),
        }
    }

    /// Attempt one ordinal until it succeeds or runs out of attempts
    async fn run_ordinal(
        &self,
        ordinal: u32,
        context: &RunContext,
        progress: &dyn BatchProgressNotifier,
    ) -> Result<LeadRecord, Exhausted> {
        let mut attempts = LeadAttempts::new(ordinal, self.params.max_attempts);
        let max = attempts.max_attempts();
        // A fresh tracker always starts at attempt 1
        let mut attempt = attempts.start().unwrap_or(1);

        loop {
            debug!("Lead #{} attempt {}/{}", ordinal, attempt, max);
            progress.on_attempt_start(ordinal, attempt, max);

            let customer_type = context.run_state.customer_type;
            let failure = match self.transaction.execute(ordinal, attempt, context).await {
                Ok(outcome) => match LeadRecord::from_outcome(ordinal, customer_type, &outcome) {
                    Ok(record) => {
                        attempts.succeed();
                        return Ok(record);
                    }
                    Err(missing) => AttemptFailure::Incomplete(missing),
                },
                Err(e) => AttemptFailure::Transaction(e),
            };

            warn!(
                "Lead #{} attempt {}/{} failed: {}",
                ordinal, attempt, max, failure
            );
            progress.on_attempt_failed(ordinal, attempt, max, &failure);

            match attempts.fail() {
                AttemptState::Attempting(next) => {
                    if let Some(delay) = self.params.backoff_after(attempt) {
                        debug!("Waiting {:?} before retrying lead #{}", delay, ordinal);
                        tokio::time::sleep(delay).await;
                    }
                    attempt = next;
                }
                _ => {
                    return Err(Exhausted {
                        ordinal,
                        attempts: attempt,
                        last_failure: failure,
                    });
                }
            }
        }
    }

    fn record_success(
        &self,
        record: LeadRecord,
        summary: &mut BatchSummary,
        audit: &dyn AuditLog,
        store: &dyn ResumeStore,
        progress: &dyn BatchProgressNotifier,
    ) {
        info!(
            "Created lead #{}: customer {} project {}",
            record.ordinal, record.customer_id, record.project_id
        );

        if let Err(e) = audit.append(&record) {
            error!("Lead #{} was created but not logged: {}", record.ordinal, e);
            summary.audit_failures += 1;
        }

        summary.last_successful_ordinal = record.ordinal;
        summary.records.push(record);

        if let Some(record) = summary.records.last() {
            progress.on_lead_created(record, summary.created(), summary.requested);
        }

        if self.params.checkpoint_each_lead
            && let Err(e) = store.persist(&summary.checkpoint())
        {
            warn!(
                "Checkpoint after lead #{} failed: {}",
                summary.last_successful_ordinal, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::audit_log::AuditError;
    use crate::ports::lead_transaction::TransactionError;
    use async_trait::async_trait;
    use leadforge_domain::{ConfigLayer, EffectiveConfig, LayerKind, LeadOutcome, RunState};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    type Scripted = Result<LeadOutcome, TransactionError>;

    /// Transaction that replays scripted results per ordinal; unscripted
    /// calls succeed
    struct ScriptedTransaction {
        script: Mutex<HashMap<u32, VecDeque<Scripted>>>,
        calls: Mutex<Vec<u32>>,
    }

    impl ScriptedTransaction {
        fn new() -> Self {
            Self {
                script: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn on(self, ordinal: u32, results: Vec<Scripted>) -> Self {
            self.script
                .lock()
                .unwrap()
                .insert(ordinal, results.into_iter().collect());
            self
        }

        fn calls_for(&self, ordinal: u32) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|o| **o == ordinal)
                .count()
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LeadTransaction for ScriptedTransaction {
        async fn execute(
            &self,
            ordinal: u32,
            _attempt: u32,
            _context: &RunContext,
        ) -> Result<LeadOutcome, TransactionError> {
            self.calls.lock().unwrap().push(ordinal);
            let next = self
                .script
                .lock()
                .unwrap()
                .get_mut(&ordinal)
                .and_then(VecDeque::pop_front);
            next.unwrap_or_else(|| Ok(outcome(ordinal)))
        }
    }

    #[derive(Default)]
    struct MemoryAuditLog {
        records: Mutex<Vec<LeadRecord>>,
        finalized: Mutex<Option<u32>>,
    }

    impl AuditLog for MemoryAuditLog {
        fn append(&self, record: &LeadRecord) -> Result<(), AuditError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn finalize(&self, summary: &BatchSummary) -> Result<PathBuf, AuditError> {
            *self.finalized.lock().unwrap() = Some(summary.created());
            Ok(PathBuf::from(format!("/reports/{}_leads.csv", summary.created())))
        }
    }

    #[derive(Default)]
    struct MemoryResumeStore {
        checkpoints: Mutex<Vec<ResumeCheckpoint>>,
        fail: bool,
    }

    impl MemoryResumeStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn last(&self) -> Option<ResumeCheckpoint> {
            self.checkpoints.lock().unwrap().last().copied()
        }

        fn count(&self) -> usize {
            self.checkpoints.lock().unwrap().len()
        }
    }

    impl ResumeStore for MemoryResumeStore {
        fn persist(&self, checkpoint: &ResumeCheckpoint) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Io("disk full".to_string()));
            }
            self.checkpoints.lock().unwrap().push(*checkpoint);
            Ok(())
        }
    }

    fn outcome(ordinal: u32) -> LeadOutcome {
        LeadOutcome {
            customer_id: Some(format!("C{ordinal}")),
            project_id: Some(format!("P{ordinal}")),
            dp_name: Some("Designer".to_string()),
            ..LeadOutcome::default()
        }
    }

    fn rejected() -> Scripted {
        Err(TransactionError::ApplicationRejected(
            "approval refused".to_string(),
        ))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    /// Context resuming today at `last_processed + 1`
    fn context(last_processed: u32, count: u32) -> RunContext {
        let last = last_processed.to_string();
        let count = count.to_string();
        let layer = ConfigLayer::from_pairs(
            "run",
            LayerKind::RunParameters,
            [
                ("environment", "preProd"),
                ("customerType", "HL"),
                ("userSelectedCityProperty", "BLR"),
                ("mobileNoStarting2digitPrefix", "77"),
                ("totalLeadsToCreate", count.as_str()),
                ("lastProcessedLeadIndex", last.as_str()),
                ("leadScriptRunDate", "18-10-2026"),
            ],
        );
        let config = EffectiveConfig::merge(&[layer]);
        let state = RunState::from_config(&config, today()).unwrap();
        RunContext::new(state, config)
    }

    #[tokio::test]
    async fn test_retry_then_success_advances() {
        let transaction = Arc::new(
            ScriptedTransaction::new().on(5, vec![rejected(), rejected(), Ok(outcome(5))]),
        );
        let use_case = RunBatchUseCase::new(transaction.clone());
        let audit = MemoryAuditLog::default();
        let store = MemoryResumeStore::default();

        let summary = use_case
            .execute(&context(4, 2), &audit, &store)
            .await
            .unwrap();

        assert_eq!(transaction.calls_for(5), 3);
        assert_eq!(transaction.calls_for(6), 1);
        let ordinals: Vec<u32> = audit
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.ordinal)
            .collect();
        assert_eq!(ordinals, vec![5, 6]);
        assert!(summary.completed);
        assert_eq!(summary.last_successful_ordinal, 6);
        assert_eq!(
            store.last(),
            Some(ResumeCheckpoint {
                last_processed_index: 6,
                run_date: today()
            })
        );
    }

    #[tokio::test]
    async fn test_exhaustion_aborts_and_persists_previous() {
        let transaction = Arc::new(
            ScriptedTransaction::new().on(7, vec![rejected(), rejected(), rejected()]),
        );
        let use_case = RunBatchUseCase::new(transaction.clone());
        let audit = MemoryAuditLog::default();
        let store = MemoryResumeStore::default();

        let err = use_case
            .execute(&context(4, 5), &audit, &store)
            .await
            .unwrap_err();

        match err {
            RunBatchError::ExhaustedAfterRetries {
                ordinal,
                attempts,
                summary,
                ..
            } => {
                assert_eq!(ordinal, 7);
                assert_eq!(attempts, 3);
                assert_eq!(summary.created(), 2);
                assert!(!summary.completed);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transaction.calls_for(8), 0);
        assert_eq!(store.last().map(|c| c.last_processed_index), Some(6));
        assert_eq!(*audit.finalized.lock().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_first_ordinal_exhausted_keeps_cursor() {
        let transaction = Arc::new(ScriptedTransaction::new().on(
            1,
            vec![
                Err(TransactionError::Unexpected("timeout".to_string())),
                Err(TransactionError::Unexpected("timeout".to_string())),
                Err(TransactionError::Unexpected("timeout".to_string())),
            ],
        ));
        let use_case = RunBatchUseCase::new(transaction);
        let store = MemoryResumeStore::default();

        let err = use_case
            .execute(&context(0, 3), &MemoryAuditLog::default(), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, RunBatchError::ExhaustedAfterRetries { ordinal: 1, .. }));
        assert_eq!(store.last().map(|c| c.last_processed_index), Some(0));
    }

    #[tokio::test]
    async fn test_partial_outcome_counts_as_failure() {
        let partial = LeadOutcome {
            customer_id: Some("C1".to_string()),
            ..LeadOutcome::default()
        };
        let transaction =
            Arc::new(ScriptedTransaction::new().on(1, vec![Ok(partial), Ok(outcome(1))]));
        let use_case = RunBatchUseCase::new(transaction.clone());
        let audit = MemoryAuditLog::default();

        let summary = use_case
            .execute(&context(0, 1), &audit, &MemoryResumeStore::default())
            .await
            .unwrap();

        assert_eq!(transaction.calls_for(1), 2);
        assert_eq!(summary.records[0].project_id, "P1");
        assert_eq!(audit.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_state_has_no_side_effects() {
        let transaction = Arc::new(ScriptedTransaction::new());
        let use_case = RunBatchUseCase::new(transaction.clone());
        let store = MemoryResumeStore::default();
        let audit = MemoryAuditLog::default();

        let mut context = context(90, 5);
        context.run_state.lead_count = 20;

        let err = use_case
            .execute(&context, &audit, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, RunBatchError::Validation(_)));
        assert_eq!(transaction.total_calls(), 0);
        assert_eq!(store.count(), 0);
        assert!(audit.finalized.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkpoint_after_each_lead() {
        let use_case = RunBatchUseCase::new(Arc::new(ScriptedTransaction::new()));
        let store = MemoryResumeStore::default();

        use_case
            .execute(&context(0, 3), &MemoryAuditLog::default(), &store)
            .await
            .unwrap();

        let saved: Vec<u32> = store
            .checkpoints
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.last_processed_index)
            .collect();
        assert_eq!(saved, vec![1, 2, 3, 3]);
    }

    #[tokio::test]
    async fn test_checkpoint_disabled_persists_once() {
        let use_case = RunBatchUseCase::new(Arc::new(ScriptedTransaction::new()))
            .with_params(BatchParams::default().with_checkpoint_each_lead(false));
        let store = MemoryResumeStore::default();

        use_case
            .execute(&context(0, 3), &MemoryAuditLog::default(), &store)
            .await
            .unwrap();

        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported() {
        let use_case = RunBatchUseCase::new(Arc::new(ScriptedTransaction::new()));

        let err = use_case
            .execute(
                &context(0, 2),
                &MemoryAuditLog::default(),
                &MemoryResumeStore::failing(),
            )
            .await
            .unwrap_err();

        match err {
            RunBatchError::Persist { summary, .. } => {
                assert_eq!(summary.created(), 2);
                assert!(!summary.persisted);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_summary_carries_report_path() {
        let use_case = RunBatchUseCase::new(Arc::new(ScriptedTransaction::new()));

        let summary = use_case
            .execute(
                &context(10, 2),
                &MemoryAuditLog::default(),
                &MemoryResumeStore::default(),
            )
            .await
            .unwrap();

        assert_eq!(summary.first_ordinal, 11);
        assert_eq!(summary.report_path, Some(PathBuf::from("/reports/2_leads.csv")));
        assert!(summary.persisted);
    }
}
