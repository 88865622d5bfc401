use coursehub_auth::{AuthError, Authenticator, BootstrapOutcome};
use coursehub_config::{AuthConfig, BootstrapConfig};
use coursehub_database::{UserRole, MIGRATOR};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "authenticator-tests-secret".into(),
        token_ttl_seconds: 3_600,
        issuer: "coursehub".into(),
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), &auth_config());

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
        })
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    async fn user_count(&self) -> TestResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[tokio::test]
async fn register_persists_learner_and_issues_token() -> TestResult {
    let ctx = TestContext::new().await?;

    let session = ctx
        .authenticator()
        .register("Alice@Example.com", "correct horse", "Alice")
        .await?;

    assert_eq!(session.user.email, "alice@example.com");
    assert_eq!(session.user.name, "Alice");
    assert_eq!(session.user.role, UserRole::Learner);
    assert!(!session.user.is_bootstrap);

    let (hash,): (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
        .bind(session.user.id)
        .fetch_one(&ctx.pool)
        .await?;
    assert!(hash.starts_with("$argon2"));

    let resolved = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await?;
    assert_eq!(resolved.public_id, session.user.public_id);
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_creates_no_record() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator()
        .register("alice@example.com", "correct horse", "Alice")
        .await?;

    let err = ctx
        .authenticator()
        .register("ALICE@example.com", "another password", "Alice Again")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserExists));
    assert_eq!(ctx.user_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn registration_requires_every_field() -> TestResult {
    let ctx = TestContext::new().await?;

    for (email, password, name) in [
        ("", "correct horse", "Alice"),
        ("alice@example.com", "", "Alice"),
        ("alice@example.com", "correct horse", "  "),
        ("not-an-email", "correct horse", "Alice"),
        ("alice@example.com", "short", "Alice"),
    ] {
        let err = ctx
            .authenticator()
            .register(email, password, name)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)), "{email:?} {password:?} {name:?}");
    }
    assert_eq!(ctx.user_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn login_checks_password() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator()
        .register("alice@example.com", "correct horse", "Alice")
        .await?;

    let session = ctx
        .authenticator()
        .login(" alice@EXAMPLE.com", "correct horse")
        .await?;
    assert_eq!(session.user.email, "alice@example.com");

    let wrong = ctx
        .authenticator()
        .login("alice@example.com", "battery staple")
        .await
        .unwrap_err();
    assert!(matches!(wrong, AuthError::InvalidCredentials));

    let unknown = ctx
        .authenticator()
        .login("bob@example.com", "correct horse")
        .await
        .unwrap_err();
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    Ok(())
}

#[tokio::test]
async fn token_of_deleted_user_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx
        .authenticator()
        .register("alice@example.com", "correct horse", "Alice")
        .await?;

    ctx.authenticator().users().delete(session.user.id).await?;

    let err = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
    Ok(())
}

#[tokio::test]
async fn token_reflects_current_role() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx
        .authenticator()
        .register("alice@example.com", "correct horse", "Alice")
        .await?;

    ctx.authenticator()
        .users()
        .update_role(session.user.id, UserRole::Instructor)
        .await?;

    let user = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await?;
    assert_eq!(user.role, UserRole::Instructor);
    Ok(())
}

#[tokio::test]
async fn profile_update_validates_and_enforces_unique_email() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx
        .authenticator()
        .register("alice@example.com", "correct horse", "Alice")
        .await?
        .user;
    ctx.authenticator()
        .register("bob@example.com", "correct horse", "Bob")
        .await?;

    let updated = ctx
        .authenticator()
        .update_profile(&alice, Some("Alice Liddell"), Some("Liddell@Example.com"))
        .await?;
    assert_eq!(updated.name, "Alice Liddell");
    assert_eq!(updated.email, "liddell@example.com");

    let taken = ctx
        .authenticator()
        .update_profile(&alice, None, Some("bob@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(taken, AuthError::UserExists));

    let invalid = ctx
        .authenticator()
        .update_profile(&alice, None, Some("nope"))
        .await
        .unwrap_err();
    assert!(matches!(invalid, AuthError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn bootstrap_admin_is_created_once() -> TestResult {
    let ctx = TestContext::new().await?;
    let config = BootstrapConfig {
        admin_email: "learnhub@gmail.com".into(),
        admin_password: Some("bootstrap secret".into()),
        admin_name: "Admin User".into(),
    };

    let created = ctx.authenticator().ensure_bootstrap_admin(&config).await?;
    let admin = match created {
        BootstrapOutcome::Created {
            user,
            generated_password,
        } => {
            assert!(generated_password.is_none());
            user
        }
        other => panic!("unexpected outcome {other:?}"),
    };
    assert!(admin.is_bootstrap);
    assert_eq!(admin.role, UserRole::Admin);

    let again = ctx.authenticator().ensure_bootstrap_admin(&config).await?;
    assert!(matches!(again, BootstrapOutcome::Existing(user) if user.id == admin.id));

    ctx.authenticator()
        .login("learnhub@gmail.com", "bootstrap secret")
        .await?;
    Ok(())
}

#[tokio::test]
async fn bootstrap_admin_without_password_gets_generated_one() -> TestResult {
    let ctx = TestContext::new().await?;
    let config = BootstrapConfig {
        admin_email: "root@example.com".into(),
        admin_password: None,
        admin_name: "Admin User".into(),
    };

    let outcome = ctx.authenticator().ensure_bootstrap_admin(&config).await?;
    let BootstrapOutcome::Created {
        generated_password: Some(password),
        ..
    } = outcome
    else {
        panic!("expected a generated password");
    };

    ctx.authenticator()
        .login("root@example.com", &password)
        .await?;
    Ok(())
}
