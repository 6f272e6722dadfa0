/// Authentication and authorization utilities
///
/// Credentials and sessions belong to the hosted auth service; this module
/// talks to it, verifies the tokens it issues, and decides who may touch
/// which board.
///
/// # Modules
///
/// - [`provider`]: Hosted auth REST client behind the `AuthProvider` trait
/// - [`jwt`]: Local access-token verification
/// - [`middleware`]: Bearer-token middleware and `AuthContext`
/// - [`password`]: Sign-up password policy
/// - [`authorization`]: Board owner/member checks
///
/// # Example
///
/// ```no_run
/// use swamp_shared::auth::jwt::validate_access_token;
/// use swamp_shared::auth::provider::{AuthProvider, HostedAuthClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HostedAuthClient::new("https://project.supabase.co", "anon-key")?;
/// let session = client.sign_in_with_password("albert@ufl.edu", "chomp1234").await?;
///
/// let claims = validate_access_token(&session.access_token, "project-jwt-secret")?;
/// assert_eq!(claims.sub, session.user.id);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod provider;
