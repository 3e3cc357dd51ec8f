use crate::models::{LocationError, LocationOptions, Position};
use crate::platform::Geolocation;

/// Ask the provider for one fix with the fixed one-shot options.
///
/// Errors are logged with their numeric code before being handed back.
pub async fn fetch_position<G>(geolocation: &G) -> Result<Position, LocationError>
where
    G: Geolocation + ?Sized,
{
    match geolocation
        .current_position(&LocationOptions::one_shot())
        .await
    {
        Ok(position) => {
            log::debug!("{position:?}");
            Ok(position)
        }
        Err(e) => {
            log::error!("Code {}: {}", e.code, e.message);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use crate::testing::FakePlatform;
    use futures::executor::block_on;

    #[test]
    fn test_fix_passes_through() {
        let platform = FakePlatform::new().with_fix(Coordinates::new(3.0, 4.0));

        let position = block_on(fetch_position(&platform)).unwrap();

        assert_eq!(position.coords, Coordinates::new(3.0, 4.0));
    }

    #[test]
    fn test_error_is_returned() {
        let platform = FakePlatform::new().with_fix_error(LocationError::timeout());

        assert_eq!(
            block_on(fetch_position(&platform)),
            Err(LocationError::timeout())
        );
    }

    #[test]
    fn test_provider_receives_one_shot_options() {
        let platform = FakePlatform::new().with_fix(Coordinates::new(3.0, 4.0));

        block_on(fetch_position(&platform));

        assert_eq!(
            platform.location_requests(),
            vec![LocationOptions::one_shot()]
        );
    }
}
