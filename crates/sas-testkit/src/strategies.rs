//! Proptest strategies for registry identifiers

use proptest::prelude::*;

/// Identifier drawn from the charset the request schema accepts
pub fn arb_identifier() -> impl Strategy<Value = String> {
    "[A-Z0-9_-]{1,12}"
}

/// Serial number; short alphabet so collisions happen
pub fn arb_serial() -> impl Strategy<Value = String> {
    "SN[0-9]{1,2}"
}

/// One of a small pool of FCC ids, some of which a fixture allow-lists
pub fn arb_fcc_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("F1".to_string()), Just("F2".to_string()), Just("F3".to_string())]
}

/// One of a small pool of user ids, some of which a fixture allow-lists
pub fn arb_user_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("U1".to_string()), Just("U2".to_string())]
}
