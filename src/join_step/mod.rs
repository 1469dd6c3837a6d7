//! Join step of the notebook query editor.
//!
//! One [`JoinStepController`] edits one join of one query stage. Data flows
//! in one direction:
//!
//! ```text
//! user action ─► JoinDraftState ─► ConditionSynchronizer ─► QueryFacade ─► QueryHost
//!                (draft, picks)    (suggestions, buckets)   (new Query)    (update_query)
//! ```
//!
//! The host owns the query. It receives a new value for every committed
//! change and hands it back through [`JoinStepController::rerender`].

mod action;
mod controller;
mod draft;
mod error;
pub mod fields;
mod host;
mod link;
mod picker;
mod sync;

pub use action::JoinStepAction;
pub use controller::{ColumnOption, ConditionView, JoinStepController, PICK_DATA};
pub use draft::{ConditionSlot, DraftCondition, JoinDraftState, Side};
pub use error::{JoinStepError, JoinStepResult};
pub use host::{QueryHost, QueryLog};
pub use link::{ClickModifiers, DataSourceLink};
pub use picker::{ActivePicker, RequestTicket, TablePickerContent};
pub use sync::{ConditionSynchronizer, SideLabel};
