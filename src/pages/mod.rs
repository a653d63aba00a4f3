//! Page objects, one per Goodbudget screen.
//!
//! Each page owns a [`PageInteraction`] built from a shared [`PageContext`]
//! instead of inheriting helpers from a base page.

pub mod envelope;
pub mod home;
pub mod interaction;
pub mod landing;
pub mod login;
pub mod signup;

pub use envelope::{EnvelopePage, EnvelopeRow};
pub use home::HomePage;
pub use interaction::{PageContext, PageError, PageErrorKind, PageInteraction, PageResult};
pub use landing::LandingPage;
pub use login::{LoginOptions, LoginPage};
pub use signup::{SignUpOptions, SignUpPage};
