//! UI Components for the SiteTester application.
//!
//! # Layout Components
//! - [`Header`] - Navigation bar with one link per audit
//! - [`Hero`] - Page title and description
//! - [`Footer`] - Page footer
//!
//! # Pages
//! - [`Home`] - Audit overview
//! - [`AuditPage`] - Upload, progress and results of one audit type
//!
//! # Feature Components
//! - [`UploadForm`] - URL source, browser/resolution pickers, session fields
//! - [`ProgressPanel`] - Progress bar and stop control
//! - [`ActivityPanel`] - Session activity log
//! - [`H1Results`], [`PhoneResults`], [`PerformanceTable`] - Result tables
//! - [`MediaView`] - Screenshot and video browser
//! - [`NoticeModal`] - Notices raised by the page

mod audit;
mod footer;
mod header;
mod hero;
mod home;
mod logs;
mod media;
mod notice;
mod progress;
mod results;
mod upload;

pub use audit::*;
pub use footer::*;
pub use header::*;
pub use hero::*;
pub use home::*;
pub use logs::*;
pub use media::*;
pub use notice::*;
pub use progress::*;
pub use results::*;
pub use upload::*;
