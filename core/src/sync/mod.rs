//! Keeping view state in step with the node: polling, paging, submission.

pub mod accounts;
pub mod feed;
pub mod pager;
pub mod poller;
pub mod submit;

pub use accounts::fetch_accounts;
pub use feed::{Feed, FeedSink, FeedState, Ticket};
pub use pager::{Page, PageRequest, PagerHandle, PagerState, TransactionPager, PAGE_SIZE};
pub use poller::{PollHandle, Poller, DEFAULT_POLL_INTERVAL};
pub use submit::{
    Decision, Notice, SubmissionJob, SubmissionPhase, SubmissionPipeline, SubmissionState,
    TransferSummary, UserPrompt,
};
