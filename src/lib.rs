//! Exclusive-claim USB barcode scanner sessions for serial number capture.
//!
//! USB HID POS: (in Honeywell user guides referenced as USB HID / USB HID Bar Code Scanner)
//!
//! The USB HID POS interface, also referred to as HID COM, delivers scanned
//! barcodes to a single claiming application instead of emulating keyboard
//! input the way the common keyboard-wedge mode does. A scanner programmed
//! into HID POS mode (the Honeywell Voyager 1200G needs the PAP131 label
//! from its user's guide scanned once) will not type into an editor; it only
//! talks to an application that has claimed it.
//!
//! With decode mode on, the device pre-decodes each scan and the report
//! carries the text label plus a symbology identifier, so no symbology
//! handling happens on the host beyond forwarding the label bytes.
//!
//! This crate claims exactly one such scanner exclusively, defends the claim
//! against competing claimants, and runs a [`session::ScanSession`] that
//! validates every scanned label against the fixed serial number pattern.

pub mod broker;
pub mod claim;
pub mod constants;
pub mod decode;
pub mod device;
pub mod devices;
pub mod error;
pub mod session;
pub mod tools;
pub mod validate;
