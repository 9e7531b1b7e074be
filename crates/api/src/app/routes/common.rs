use std::str::FromStr;

use stockroom_core::DomainError;

use crate::app::errors;

/// Parse a serial id taken from the request path.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}
