//! Identity cache and authentication state, driven through the public API.

mod common;

use common::{ScriptedTransport, project_json, session_with_profile, session_with_project};
use pretty_assertions::assert_eq;
use sad_client::{
    ClientError, EntityId, EntityKind, ProjectPermissions, RequiredPermission, Response,
};

#[test]
fn second_fetch_refreshes_the_same_object() {
    let (transport, session, first) = session_with_project();
    transport.reply(200, project_json("AQ==", "notes", r#"{"7": 5}"#));

    let response = session.get_project("notes").unwrap();
    let second = response.project().unwrap();

    assert!(first.same_object(second));
    assert_eq!(
        first.permission_for(7),
        Some(ProjectPermissions::VIEW | ProjectPermissions::EDIT)
    );
    assert_eq!(session.cached_projects().len(), 1);
}

#[test]
fn new_auth_records_id_and_clears_cache() {
    let (transport, session, _project) = session_with_project();
    transport.reply(200, "42");

    let response = session.new_auth("secret").unwrap();

    assert_eq!(response.auth_id(), Some(42));
    assert_eq!(session.auth_id(), Some(42));
    assert!(session.cached_projects().is_empty());
}

#[test]
fn reauthenticating_as_same_id_keeps_cache() {
    let transport = ScriptedTransport::new();
    let session = transport.session();
    transport.reply(200, "");
    session.authenticate(9, "pw").unwrap();

    transport.reply(200, project_json("AQ==", "notes", "{}"));
    session.get_project("notes").unwrap();

    transport.reply(200, "");
    let response = session.authenticate(9, "pw").unwrap();
    assert!(matches!(response, Response::Success(_)));
    assert_eq!(session.cached_projects().len(), 1);

    transport.reply(200, "");
    session.authenticate(10, "pw").unwrap();
    assert!(session.cached_projects().is_empty());
    assert_eq!(session.auth_id(), Some(10));
}

#[test]
fn failed_authentication_leaves_state_alone() {
    let (transport, session, _project) = session_with_project();
    transport.reply(401, "Bad password");

    let response = session.authenticate(3, "nope").unwrap();

    assert!(matches!(response, Response::InvalidAuth(_)));
    assert_eq!(session.auth_id(), None);
    assert_eq!(session.cached_projects().len(), 1);
}

#[test]
fn new_auth_with_non_numeric_body_is_malformed() {
    let transport = ScriptedTransport::new();
    let session = transport.session();
    transport.reply(200, "not a number");

    let err = session.new_auth("pw").unwrap_err();
    assert!(matches!(err, ClientError::MalformedPayload { .. }));
    assert_eq!(session.auth_id(), None);
}

#[test]
fn deleted_project_is_not_resurrected() {
    let (transport, session, project) = session_with_project();
    transport.reply(200, "");
    assert!(project.delete().unwrap().is_success());
    assert!(session.cached_projects().is_empty());

    transport.reply(200, project_json("AQ==", "notes", "{}"));
    let again = session.get_project("notes").unwrap();
    assert!(!again.project().unwrap().same_object(&project));
}

#[test]
fn profile_calls_after_project_delete_do_not_recache_it() {
    let (transport, session, project, profile) = session_with_profile();
    transport.reply(200, "");
    assert!(project.delete().unwrap().is_success());
    assert!(session.cached_projects().is_empty());

    transport.reply(200, project_json("Ag==", "main", "{}"));
    assert!(profile.update().unwrap().is_success());
    assert!(session.cached_projects().is_empty());

    transport.reply(200, project_json("Ag==", "main", "{}"));
    let fetched = project.get_profile("main").unwrap();
    assert!(fetched.profile().is_some());
    assert!(session.cached_projects().is_empty());
}

#[test]
fn delete_not_found_also_evicts() {
    let (transport, session, project) = session_with_project();
    transport.reply(404, "No such Project");

    let response = project.delete().unwrap();

    assert!(matches!(response, Response::NotFound(_)));
    assert!(session.cached_projects().is_empty());
}

#[test]
fn delete_refused_keeps_cache() {
    let (transport, session, project) = session_with_project();
    transport.reply(403, "nope");

    let response = project.delete().unwrap();

    assert_eq!(
        response.required_permission(),
        Some(RequiredPermission::Project(ProjectPermissions::DELETE))
    );
    assert_eq!(session.cached_projects().len(), 1);
}

#[test]
fn project_update_with_new_identity_is_out_of_date() {
    let (transport, session, project) = session_with_project();
    transport.reply(200, project_json("Ag==", "notes", "{}"));

    let err = project.update().unwrap_err();

    assert!(matches!(
        err,
        ClientError::OutOfDate { kind: EntityKind::Project, ref name } if name == "notes"
    ));
    assert!(session.cached_projects().is_empty());
    assert_eq!(project.id(), EntityId::new(1));
}

#[test]
fn project_update_refreshes_in_place() {
    let (transport, _session, project) = session_with_project();
    transport.reply(200, project_json("AQ==", "notes", r#"{"7": 63}"#));

    assert!(project.update().unwrap().is_success());
    assert_eq!(project.permission_for(7), Some(ProjectPermissions::ALL));
}

#[test]
fn profile_update_with_new_identity_is_out_of_date() {
    let (transport, session, _project, profile) = session_with_profile();
    transport.reply(200, project_json("Aw==", "main", "{}"));

    let err = profile.update().unwrap_err();

    assert!(matches!(
        err,
        ClientError::OutOfDate {
            kind: EntityKind::Profile,
            ..
        }
    ));
    assert!(session.cached_profiles().is_empty());
}

#[test]
fn profile_fetch_refreshes_same_object() {
    let (transport, session, project, profile) = session_with_profile();
    transport.reply(200, project_json("Ag==", "main", r#"{"7": 3}"#));

    let response = project.get_profile("main").unwrap();

    assert!(response.profile().unwrap().same_object(&profile));
    assert_eq!(session.cached_profiles().len(), 1);
    assert_eq!(profile.permissions().len(), 1);
}

#[test]
fn all_profiles_are_fresh_snapshots() {
    let (transport, session, project, profile) = session_with_profile();
    transport.reply(
        200,
        format!(
            "[{}, {}]",
            project_json("Ag==", "main", "{}"),
            project_json("Aw==", "scratch", "{}")
        ),
    );

    let response = project.get_all_profiles().unwrap();

    assert_eq!(response.profiles().len(), 2);
    assert!(!response.profiles()[0].same_object(&profile));
    assert_eq!(session.cached_profiles().len(), 1);
}

#[test]
fn remove_profile_evicts_by_name() {
    let (transport, session, project, _profile) = session_with_profile();
    transport.reply(404, "No such Profile");

    let response = project.remove_profile("main").unwrap();

    assert!(matches!(response, Response::NotFound(_)));
    assert!(session.cached_profiles().is_empty());
}

#[test]
fn profile_remove_evicts_itself() {
    let (transport, session, _project, profile) = session_with_profile();
    transport.reply(200, "");

    assert!(profile.remove().unwrap().is_success());
    assert!(session.cached_profiles().is_empty());
    assert_eq!(
        transport.last_request().query_value("profile_name"),
        Some("main")
    );
}

#[test]
fn clear_cache_forgets_everything() {
    let (_transport, session, _project, _profile) = session_with_profile();
    session.clear_cache();
    assert!(session.cached_projects().is_empty());
    assert!(session.cached_profiles().is_empty());
}

#[test]
fn dropped_session_fails_without_request() {
    let (transport, session, project, profile) = session_with_profile();
    let sent = transport.request_count();
    drop(session);

    assert!(matches!(project.update(), Err(ClientError::SessionGone)));
    assert!(matches!(profile.read(), Err(ClientError::SessionGone)));
    assert_eq!(transport.request_count(), sent);
}

#[test]
fn dropped_project_fails_without_request() {
    let (transport, session, project, profile) = session_with_profile();
    let sent = transport.request_count();
    session.clear_cache();
    drop(project);

    assert!(matches!(profile.read(), Err(ClientError::ProjectGone)));
    assert!(matches!(profile.project(), Err(ClientError::ProjectGone)));
    assert_eq!(transport.request_count(), sent);
}

#[test]
fn transport_failure_propagates() {
    let transport = ScriptedTransport::new();
    let session = transport.session();
    transport.fail("connection refused");

    let err = session.get_project("notes").unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.to_string().contains("connection refused"));
}
