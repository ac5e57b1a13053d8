use anyhow::Result;
use jsonwebtoken::{encode, EncodingKey, Header};
use portal_session::config::CookieConfig;
use portal_session::session::{CookieJar, IdentityClaims, SessionOracle, StaticEnvironment};
use serde_json::{json, Value};

/// Sign an identity token the way the backend does; the signature is never checked
fn mint(claims: Value) -> Result<String> {
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-verified-client-side"),
    )?)
}

fn oracle(header: &str) -> SessionOracle<StaticEnvironment> {
    SessionOracle::new(StaticEnvironment::new(CookieJar::parse(header)))
}

#[test]
fn test_logged_in_user_facts() -> Result<()> {
    let id_token = mint(json!({
        "sub": "42",
        "preferred_username": "jdoe",
        "name": "Jane Doe",
        "email": "jane@example.org",
        "exp": 1_900_000_000,
    }))?;
    let oracle = oracle(&format!("access_token=opaque; id_token={}", id_token));

    let facts = oracle.facts();
    assert!(facts.is_logged_in);
    assert!(facts.access_token_present);
    assert!(!facts.authentication_disabled);
    assert!(!facts.guest_task_completion_only);
    assert_eq!(facts.preferred_display_name.as_deref(), Some("jdoe"));
    assert_eq!(facts.email.as_deref(), Some("jane@example.org"));
    assert_eq!(
        facts.expires_at.map(|at| at.timestamp()),
        Some(1_900_000_000)
    );

    let serialized = serde_json::to_value(&facts)?;
    assert_eq!(serialized["preferred_display_name"], "jdoe");
    Ok(())
}

#[test]
fn test_identity_without_access_token_is_not_logged_in() -> Result<()> {
    let id_token = mint(json!({ "given_name": "Jane" }))?;
    let oracle = oracle(&format!("id_token={}", id_token));

    assert!(!oracle.is_logged_in());
    assert_eq!(oracle.preferred_display_name().as_deref(), Some("Jane"));
    assert_eq!(oracle.email(), None);
    Ok(())
}

#[test]
fn test_flag_claims() -> Result<()> {
    let guest = mint(json!({ "only_guest_task_completion": true }))?;
    let oracle = oracle(&format!("access_token=x; id_token={}", guest));
    assert!(oracle.guest_task_completion_only());
    assert!(!oracle.authentication_disabled());

    let disabled = mint(json!({ "authentication_disabled": true }))?;
    let oracle = oracle_with_custom_names(&disabled);
    assert!(oracle.authentication_disabled());
    assert!(oracle.is_logged_in());
    Ok(())
}

fn oracle_with_custom_names(id_token: &str) -> SessionOracle<StaticEnvironment> {
    let jar = CookieJar::new()
        .with("portal_access", "token")
        .with("portal_identity", id_token);
    SessionOracle::with_cookie_names(
        StaticEnvironment::new(jar),
        CookieConfig {
            access_token_name: "portal_access".to_string(),
            id_token_name: "portal_identity".to_string(),
        },
    )
}

#[test]
fn test_unusable_identity_tokens_default_everything() {
    for header in [
        "access_token=x; id_token=undefined",
        "access_token=x; id_token=",
        "access_token=x; id_token=not-a-token",
        "access_token=x; id_token=a.%%%.c",
    ] {
        let facts = oracle(header).facts();
        assert!(facts.is_logged_in, "{}", header);
        assert_eq!(facts.preferred_display_name, None, "{}", header);
        assert_eq!(facts.email, None, "{}", header);
        assert!(!facts.authentication_disabled, "{}", header);
        assert!(!facts.guest_task_completion_only, "{}", header);
    }
}

#[test]
fn test_claims_decode_minted_token() -> Result<()> {
    let token = mint(json!({ "email": "a@b.c", "roles": ["admin"] }))?;
    let claims = IdentityClaims::decode(&token)?;

    assert_eq!(claims.get_str("email"), Some("a@b.c"));
    assert_eq!(claims.get("roles"), Some(&json!(["admin"])));
    assert!(!claims.contains("name"));
    Ok(())
}
