//! Unit tests for JWT functionality.

#[cfg(test)]
mod tests {
    use crate::auth::Claims;
    use crate::jwt::{JwtConfig, JwtError, JwtService};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            token_expires_secs: 3600,
        })
    }

    #[test]
    fn test_claims_new_sets_fields() {
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, "artist@example.com", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.email, "artist@example.com");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_issue_and_validate() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let token = service
            .issue_token(user_id, "artist@example.com")
            .expect("token should encode");
        let claims = service.validate_token(&token).expect("token should decode");

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.email, "artist@example.com");
        assert_eq!(service.expires_in(), 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            // well past the default 60s leeway
            token_expires_secs: -600,
        });

        let token = service
            .issue_token(Uuid::new_v4(), "artist@example.com")
            .expect("token should encode");

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(JwtConfig {
            secret: "another-secret".to_string(),
            token_expires_secs: 3600,
        });
        let token = other
            .issue_token(Uuid::new_v4(), "artist@example.com")
            .expect("token should encode");

        assert!(matches!(
            test_service().validate_token(&token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(test_service().validate_token("invalid.token.here").is_err());
    }
}
