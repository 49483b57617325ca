use crate::core_network::pasv_pool::PasvReservation;
use crate::core_registry::PasswordCheck;

/// Authentication and working-directory state scoped to one control channel.
///
/// A session is created when USER is accepted for processing and dies with
/// its channel. `is_authorized` only ever goes false -> true, through the
/// single password exchange tied to this session.
pub struct Session {
    pub username: String,
    pub is_authorized: bool,
    pub current_dir: String,
    password_check: Option<PasswordCheck>,
    reservation: Option<PasvReservation>,
}

impl Session {
    pub fn login_as(username: &str) -> Self {
        Self {
            username: username.to_string(),
            is_authorized: false,
            current_dir: String::from("/"),
            password_check: None,
            reservation: None,
        }
    }

    pub fn authorize(&mut self) {
        self.is_authorized = true;
    }

    /// Stores the single-use password callback yielded by the Username-Check
    /// handler. A later USER overwrites it.
    pub fn store_password_check(&mut self, check: PasswordCheck) {
        self.password_check = Some(check);
    }

    pub fn take_password_check(&mut self) -> Option<PasswordCheck> {
        self.password_check.take()
    }

    pub fn is_pasv_configured(&self) -> bool {
        self.reservation.is_some()
    }

    /// Replaces any pending reservation; a second PASV before the first data
    /// connection arrives supersedes it.
    pub fn set_reservation(&mut self, reservation: PasvReservation) {
        self.reservation = Some(reservation);
    }

    pub fn take_reservation(&mut self) -> Option<PasvReservation> {
        self.reservation.take()
    }
}
