use crate::models::{Permission, PermissionStatus, Rationale};
use crate::platform::PermissionService;

/// First Android API level that enforces runtime permission prompts
pub const RUNTIME_PERMISSIONS_MIN_API: u32 = 23;

/// Make sure `permission` is held, prompting the user if it is not.
///
/// Returns `true` when the caller may proceed. Service errors count as not
/// granted. Repeated calls may prompt repeatedly.
pub async fn ensure_permission<S>(
    service: &S,
    permission: Permission,
    rationale: Option<&Rationale>,
) -> bool
where
    S: PermissionService + ?Sized,
{
    if permission == Permission::FineLocation
        && let Some(api_level) = service.api_level()
        && api_level < RUNTIME_PERMISSIONS_MIN_API
    {
        log::debug!("API level {api_level} grants {permission} permission at install time");
        return true;
    }

    match service.check(permission).await {
        Ok(true) => {
            log::info!("{permission} permission already granted");
            return true;
        }
        Ok(false) => {}
        Err(e) => {
            log::warn!("Failed to check {permission} permission: {e}");
            return false;
        }
    }

    match service.request(permission, rationale).await {
        Ok(PermissionStatus::Granted) => {
            log::info!("{permission} permission granted");
            true
        }
        Ok(PermissionStatus::Denied) | Ok(PermissionStatus::NeverAskAgain) => {
            log::info!("{permission} permission denied by user.");
            false
        }
        Err(e) => {
            log::warn!("Failed to request {permission} permission: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;
    use futures::executor::block_on;
    use rstest::rstest;

    #[test]
    fn test_granted_check_skips_request() {
        let platform = FakePlatform::new().with_granted(Permission::Camera);

        assert!(block_on(ensure_permission(&platform, Permission::Camera, None)));
        assert!(platform.permission_requests().is_empty());
    }

    #[rstest]
    #[case(PermissionStatus::Granted, true)]
    #[case(PermissionStatus::Denied, false)]
    #[case(PermissionStatus::NeverAskAgain, false)]
    fn test_request_answer_decides(#[case] answer: PermissionStatus, #[case] expected: bool) {
        let platform = FakePlatform::new().with_request_answer(Permission::Camera, answer);

        let granted = block_on(ensure_permission(
            &platform,
            Permission::Camera,
            Some(&Rationale::camera()),
        ));

        assert_eq!(granted, expected);
        assert_eq!(platform.permission_requests(), vec![Permission::Camera]);
    }

    #[test]
    fn test_old_api_level_short_circuits_location() {
        let platform = FakePlatform::new()
            .with_api_level(22)
            .with_request_answer(Permission::FineLocation, PermissionStatus::Denied);

        assert!(block_on(ensure_permission(
            &platform,
            Permission::FineLocation,
            None
        )));
        assert!(platform.permission_checks().is_empty());
    }

    #[test]
    fn test_old_api_level_still_checks_camera() {
        let platform = FakePlatform::new()
            .with_api_level(22)
            .with_request_answer(Permission::Camera, PermissionStatus::Denied);

        assert!(!block_on(ensure_permission(&platform, Permission::Camera, None)));
        assert_eq!(platform.permission_checks(), vec![Permission::Camera]);
    }

    #[test]
    fn test_api_23_prompts_for_location() {
        let platform = FakePlatform::new()
            .with_api_level(23)
            .with_request_answer(Permission::FineLocation, PermissionStatus::Granted);

        assert!(block_on(ensure_permission(
            &platform,
            Permission::FineLocation,
            None
        )));
        assert_eq!(platform.permission_requests(), vec![Permission::FineLocation]);
    }

    #[test]
    fn test_service_error_is_not_granted() {
        let platform = FakePlatform::new().with_failing_permissions();

        assert!(!block_on(ensure_permission(&platform, Permission::Camera, None)));
    }

    #[test]
    fn test_gate_does_not_deduplicate_prompts() {
        let platform =
            FakePlatform::new().with_request_answer(Permission::Camera, PermissionStatus::Denied);

        block_on(ensure_permission(&platform, Permission::Camera, None));
        block_on(ensure_permission(&platform, Permission::Camera, None));

        assert_eq!(
            platform.permission_requests(),
            vec![Permission::Camera, Permission::Camera]
        );
    }
}
