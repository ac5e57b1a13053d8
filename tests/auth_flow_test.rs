use anyhow::Result;
use portal_session::auth::{AuthFlow, DeepLinkTarget, NavigationCommand};
use portal_session::config::BackendConfig;
use portal_session::session::{CookieJar, NavigationLocation, SessionOracle, StaticEnvironment};
use url::Url;
use uuid::Uuid;

fn flow() -> AuthFlow {
    AuthFlow::from_config(&BackendConfig::default())
}

#[test]
fn test_deep_link_login_round_trip() -> Result<()> {
    let guid = Uuid::new_v4().to_string();
    let page = Url::parse(&format!("https://portal.example.org/tasks/1234/{}", guid))?;
    let location = NavigationLocation::from(&page);

    let login_url = flow().build_login_url(Some(&location));
    let parsed = Url::parse(&login_url)?;
    assert_eq!(parsed.path(), "/v1.0/login");

    let params: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("redirect_url".to_string(), page.to_string()),
            ("process_instance_id".to_string(), "1234".to_string()),
            ("task_guid".to_string(), guid.clone()),
        ]
    );

    let target = DeepLinkTarget::from_path(page.path()).expect("task path matches");
    assert_eq!(target.process_instance_id, "1234");
    assert_eq!(target.task_guid, guid);
    Ok(())
}

#[test]
fn test_non_task_pages_have_no_deep_link() -> Result<()> {
    for raw in [
        "https://portal.example.org/",
        "https://portal.example.org/tasks",
        "https://portal.example.org/tasks/12/not-a-guid",
        "https://portal.example.org/process-instances/12",
    ] {
        let location = NavigationLocation::from(&Url::parse(raw)?);
        let login_url = flow().build_login_url(Some(&location));
        assert!(!login_url.contains("process_instance_id"), "{}", raw);
        assert!(!login_url.contains("task_guid"), "{}", raw);
    }
    Ok(())
}

#[test]
fn test_uppercase_guid_is_not_a_deep_link() {
    let guid = Uuid::new_v4().to_string().to_uppercase();
    assert_eq!(DeepLinkTarget::from_path(&format!("/tasks/7/{}", guid)), None);
}

#[test]
fn test_login_and_logout_navigation() -> Result<()> {
    let page = Url::parse("https://portal.example.org/admin?page=2")?;
    let location = NavigationLocation::from(&page);

    let anonymous =
        SessionOracle::new(StaticEnvironment::new(CookieJar::new()).at(location.clone()));
    let command = flow().ensure_logged_in(&anonymous).expect("login required");
    assert_eq!(
        command,
        NavigationCommand::Navigate {
            url: concat!(
                "http://localhost:7000/v1.0/login",
                "?redirect_url=https%3A%2F%2Fportal.example.org%2Fadmin%3Fpage%3D2"
            )
            .to_string()
        }
    );
    assert_eq!(
        serde_json::to_value(&command)?["command"],
        serde_json::json!("navigate")
    );

    let session = SessionOracle::new(
        StaticEnvironment::new(CookieJar::parse("access_token=abc; id_token=h.p.s")).at(location),
    );
    assert_eq!(flow().ensure_logged_in(&session), None);
    assert_eq!(
        flow().logout(&session).url(),
        "http://localhost:7000/v1.0/logout?redirect_url=https://portal.example.org&id_token=h.p.s"
    );
    Ok(())
}
