//! Bounded-slot device trust registry.
//!
//! The vault trusts at most `capacity` devices (default 2). A device is
//! recognized by its fingerprint, the hex SHA-256 of its local secret.
//! An empty registry trusts everyone; once slots fill up, unrecognized
//! devices are refused. Fingerprint comparison is constant-time.

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::errors::{Result, VaultError};

use super::document::DeviceSlot;

/// Default number of device slots per vault.
pub const DEFAULT_DEVICE_CAPACITY: usize = 2;

/// Outcome of [`register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The device took a new slot. Callers log `device_registered`.
    New,
    /// The device already held a slot; only `last_access` moved.
    Refreshed,
}

fn fingerprints_match(a: &str, b: &str) -> bool {
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

/// Whether this fingerprint already holds a slot.
pub fn is_trusted(slots: &[DeviceSlot], fingerprint: &str) -> bool {
    slots
        .iter()
        .any(|slot| fingerprints_match(&slot.fingerprint, fingerprint))
}

/// Whether this device may proceed with an unlock.
///
/// An empty registry admits anyone (the device enrolls on success).
/// Otherwise: trusted devices pass, and unknown devices pass only while
/// a free slot remains.
pub fn can_access(slots: &[DeviceSlot], fingerprint: &str, capacity: usize) -> bool {
    if slots.is_empty() {
        return true;
    }
    if is_trusted(slots, fingerprint) {
        return true;
    }
    slots.len() < capacity
}

/// Enroll a device, or refresh its `last_access` if it already holds a
/// slot (idempotent). Fails with [`VaultError::DeviceLimitExceeded`]
/// when every slot is taken by someone else.
pub fn register(
    slots: &mut Vec<DeviceSlot>,
    name: &str,
    fingerprint: &str,
    capacity: usize,
    now_ms: i64,
) -> Result<Registration> {
    if let Some(slot) = slots
        .iter_mut()
        .find(|slot| fingerprints_match(&slot.fingerprint, fingerprint))
    {
        slot.last_access = now_ms;
        return Ok(Registration::Refreshed);
    }

    if slots.len() >= capacity {
        return Err(VaultError::DeviceLimitExceeded { limit: capacity });
    }

    slots.push(DeviceSlot {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        fingerprint: fingerprint.to_string(),
        registered_at: now_ms,
        last_access: now_ms,
    });

    Ok(Registration::New)
}

/// Remove a device by slot id, freeing its slot. Returns the removed
/// slot so callers can name it in logs.
pub fn revoke(slots: &mut Vec<DeviceSlot>, device_id: &str) -> Result<DeviceSlot> {
    let index = slots
        .iter()
        .position(|slot| slot.id == device_id)
        .ok_or_else(|| VaultError::DeviceNotFound(device_id.to_string()))?;

    Ok(slots.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn registry_with(fingerprints: &[&str]) -> Vec<DeviceSlot> {
        let mut slots = Vec::new();
        for fp in fingerprints {
            register(&mut slots, "test device", fp, DEFAULT_DEVICE_CAPACITY, NOW).unwrap();
        }
        slots
    }

    #[test]
    fn empty_registry_admits_anyone() {
        assert!(can_access(&[], "fp-unknown", DEFAULT_DEVICE_CAPACITY));
    }

    #[test]
    fn trusted_device_is_admitted_even_at_capacity() {
        let slots = registry_with(&["fp-a", "fp-b"]);
        assert!(can_access(&slots, "fp-a", DEFAULT_DEVICE_CAPACITY));
        assert!(can_access(&slots, "fp-b", DEFAULT_DEVICE_CAPACITY));
    }

    #[test]
    fn unknown_device_is_admitted_only_while_a_slot_is_free() {
        let one = registry_with(&["fp-a"]);
        assert!(can_access(&one, "fp-new", DEFAULT_DEVICE_CAPACITY));

        let full = registry_with(&["fp-a", "fp-b"]);
        assert!(!can_access(&full, "fp-new", DEFAULT_DEVICE_CAPACITY));
    }

    #[test]
    fn register_fills_a_slot() {
        let mut slots = Vec::new();
        let outcome = register(&mut slots, "Desktop (linux)", "fp-a", 2, NOW).unwrap();

        assert_eq!(outcome, Registration::New);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].name, "Desktop (linux)");
        assert_eq!(slots[0].fingerprint, "fp-a");
        assert_eq!(slots[0].registered_at, NOW);
        assert_eq!(slots[0].last_access, NOW);
        assert!(!slots[0].id.is_empty());
    }

    #[test]
    fn register_is_idempotent_and_refreshes_last_access() {
        let mut slots = registry_with(&["fp-a"]);
        let original_id = slots[0].id.clone();

        let outcome = register(&mut slots, "ignored", "fp-a", 2, NOW + 5).unwrap();

        assert_eq!(outcome, Registration::Refreshed);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].id, original_id);
        assert_eq!(slots[0].name, "test device");
        assert_eq!(slots[0].last_access, NOW + 5);
    }

    #[test]
    fn register_fails_when_full() {
        let mut slots = registry_with(&["fp-a", "fp-b"]);

        let err = register(&mut slots, "third", "fp-c", 2, NOW).unwrap_err();
        assert!(matches!(err, VaultError::DeviceLimitExceeded { limit: 2 }));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn revoke_frees_a_slot() {
        let mut slots = registry_with(&["fp-a", "fp-b"]);
        let id = slots[0].id.clone();

        let removed = revoke(&mut slots, &id).unwrap();
        assert_eq!(removed.fingerprint, "fp-a");
        assert_eq!(slots.len(), 1);

        // The freed slot is usable again.
        let outcome = register(&mut slots, "replacement", "fp-c", 2, NOW).unwrap();
        assert_eq!(outcome, Registration::New);
    }

    #[test]
    fn revoke_unknown_id_fails() {
        let mut slots = registry_with(&["fp-a"]);
        let err = revoke(&mut slots, "no-such-id").unwrap_err();
        assert!(matches!(err, VaultError::DeviceNotFound(_)));
    }

    #[test]
    fn larger_capacity_is_respected() {
        let mut slots = Vec::new();
        for i in 0..3 {
            let fp = format!("fp-{i}");
            register(&mut slots, "dev", &fp, 3, NOW).unwrap();
        }
        assert_eq!(slots.len(), 3);
        assert!(!can_access(&slots, "fp-x", 3));
    }
}
