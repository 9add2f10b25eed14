/// Return a 403 problem from the handler unless the caller holds the permission.
///
/// Usage in handler:
/// ```ignore
/// pub async fn user_lookup(
///     RequireAuth(auth): RequireAuth,
///     State(state): State<Arc<AdminPanelState>>,
///     Json(request): Json<UserLookupRequest>,
/// ) -> Result<impl IntoResponse, Problem> {
///     permission_guard!(auth, AccessAdminPanel);
///
///     // Your handler logic here
/// }
/// ```
#[macro_export]
macro_rules! permission_guard {
    ($auth:expr, $permission:ident) => {
        if !$auth.has_permission(&$crate::permissions::Permission::$permission) {
            return Err(::atrium_core::error_builder::forbidden()
                .problem("insufficient-permissions")
                .title("Insufficient Permissions")
                .detail(format!(
                    "This operation requires the {} permission",
                    $crate::permissions::Permission::$permission
                ))
                .value(
                    "required_permission",
                    $crate::permissions::Permission::$permission.to_string(),
                )
                .build());
        }
    };
}
