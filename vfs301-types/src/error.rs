pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown device {vendor_id:04X}:{product_id:04X}")]
    UnknownDevice {
        vendor_id: u16,
        product_id: u16,
    },
}
