#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    // The device did not answer within its poll budget. "Device absent"
    // and "device stuck" are not distinguished.
    DeviceTimeout,
    // The medium holds no valid catalog image. Callers treat this as a
    // first boot, not as corruption.
    BadMagic,
    CapacityExceeded,
    NotFound,
    AlreadyExists,
    ForbiddenRoot,
    NameTooLong,
    ContentTooLong,
}
