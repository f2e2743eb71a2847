//! Staff login gate. A shared password and a session flag, nothing more;
//! this keeps curious players out of the check-in screens, it is not a
//! security boundary.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

pub struct StaffSession {
    password: String,
    logged_in: AtomicBool,
}

impl StaffSession {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            logged_in: AtomicBool::new(false),
        }
    }

    pub fn login(&self, attempt: &str) -> Result<()> {
        if attempt == self.password {
            self.logged_in.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(Error::Validation("incorrect password".to_string()))
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    pub fn require_auth(&self) -> Result<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(Error::Validation("staff login required".to_string()))
        }
    }

    pub fn logout(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }
}
