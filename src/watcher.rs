use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::events::RequestCompleted;
use crate::judge_api::SubmissionChecker;
use crate::notifier::Notifier;
use crate::submission_handler::{handle_accepted_submission, handle_failed_submission};
use crate::submission_tracker::{SubmissionTracker, SubmissionTracking};
use crate::submission_url::{classify, UrlClass};

/// What happened to a single completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Ignored,
    TestRun,
    Duplicate,
    FetchFailed,
    Pending,
    Accepted { delivered: bool },
    Rejected,
}

pub struct SubmissionWatcher<C, N> {
    tracker: Arc<Mutex<SubmissionTracker>>,
    checker: Arc<C>,
    notifier: Arc<N>,
}

impl<C, N> Clone for SubmissionWatcher<C, N> {
    fn clone(&self) -> Self {
        SubmissionWatcher {
            tracker: self.tracker.clone(),
            checker: self.checker.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<C, N> SubmissionWatcher<C, N>
where
    C: SubmissionChecker + 'static,
    N: Notifier + 'static,
{
    pub fn new(tracker: SubmissionTracker, checker: C, notifier: N) -> Self {
        SubmissionWatcher {
            tracker: Arc::new(Mutex::new(tracker)),
            checker: Arc::new(checker),
            notifier: Arc::new(notifier),
        }
    }

    pub fn tracker(&self) -> Arc<Mutex<SubmissionTracker>> {
        self.tracker.clone()
    }

    pub async fn on_request_completed(&self, event: &RequestCompleted) -> CheckOutcome {
        let submission_id = match classify(&event.url) {
            UrlClass::NotSubmission | UrlClass::Unrecognised => {
                debug!("Ignoring request {}", event.url);
                return CheckOutcome::Ignored;
            }
            UrlClass::TestRun(id) => {
                info!("Ignoring 'Run Code' or test case: {}", id);
                return CheckOutcome::TestRun;
            }
            UrlClass::Submission(id) => id,
        };

        // Check and claim under one lock so a second event for the same id
        // cannot slip in while the fetch below is in flight.
        {
            let mut tracker = self.tracker.lock().await;
            if tracker.is_duplicate(submission_id) {
                debug!("Submission {} already tracked", submission_id);
                return CheckOutcome::Duplicate;
            }
            tracker.start_processing(submission_id);
        }

        let response = match self.checker.check_submission(&event.url).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to check submission {}: {}", submission_id, e);
                self.tracker.lock().await.cancel_processing(submission_id);
                return CheckOutcome::FetchFailed;
            }
        };

        if !response.is_finished() {
            debug!("Submission {} still grading ({})", submission_id, response.state);
            self.tracker.lock().await.cancel_processing(submission_id);
            return CheckOutcome::Pending;
        }

        self.tracker.lock().await.complete_processing(submission_id);
        info!(
            "Valid submission detected, id: {} status: {}",
            submission_id,
            response.status_msg.as_deref().unwrap_or("unknown")
        );

        if response.is_accepted() {
            let delivered = handle_accepted_submission(
                self.notifier.as_ref(),
                &response.payload,
                submission_id,
                event.tab_id,
            )
            .await;
            CheckOutcome::Accepted { delivered }
        } else {
            handle_failed_submission(&response.payload, submission_id);
            CheckOutcome::Rejected
        }
    }

    /// Consume completed requests until the channel closes, checking up to
    /// `max_concurrent` of them at once.
    pub async fn run(self, mut receiver: mpsc::Receiver<RequestCompleted>, max_concurrent: usize) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut active_checks: Vec<JoinHandle<()>> = Vec::new();

        while let Some(event) = receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!("Check semaphore closed: {}", e);
                    break;
                }
            };

            let watcher = self.clone();
            active_checks.push(tokio::spawn(async move {
                let outcome = watcher.on_request_completed(&event).await;
                debug!("Request {} finished with {:?}", event.url, outcome);
                drop(permit);
            }));
            active_checks.retain(|handle| !handle.is_finished());
        }

        for result in futures::future::join_all(active_checks).await {
            if let Err(e) = result {
                error!("Check task failed: {}", e);
            }
        }
    }
}
