//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sad_client::{ApiRequest, ClientError, Reply, Session, Transport};

pub const HOST: &str = "http://sad.test";

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<Reply, String>>,
    requests: Vec<ApiRequest>,
}

/// Transport that answers from a queue and records every request.
///
/// Clones share the same queue, so a test keeps one handle for scripting and
/// inspection while the session owns another.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(Reply::new(status, body)));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .replies
            .push_back(Err(message.to_owned()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn session(&self) -> Session {
        Session::with_transport(HOST, self.clone())
    }
}

impl Transport for ScriptedTransport {
    fn perform(&self, host: &str, request: ApiRequest) -> Result<Reply, ClientError> {
        assert_eq!(host, HOST);
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        match script.replies.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ClientError::Transport(message.into())),
            None => panic!("unscripted request"),
        }
    }
}

pub fn project_json(id: &str, name: &str, permissions: &str) -> String {
    format!(r#"{{"id": "{id}", "name": "{name}", "permissions": {permissions}}}"#)
}

/// Session holding project "notes" (id 1, base64 "AQ==").
pub fn session_with_project() -> (ScriptedTransport, Session, sad_client::Project) {
    let transport = ScriptedTransport::new();
    let session = transport.session();
    transport.reply(200, project_json("AQ==", "notes", r#"{"7": 4}"#));
    let project = session
        .get_project("notes")
        .unwrap()
        .project()
        .cloned()
        .expect("project response");
    (transport, session, project)
}

/// [`session_with_project`] plus its cached profile "main" (id 2, "Ag==").
pub fn session_with_profile() -> (
    ScriptedTransport,
    Session,
    sad_client::Project,
    sad_client::Profile,
) {
    let (transport, session, project) = session_with_project();
    transport.reply(200, project_json("Ag==", "main", r#"{"7": 1}"#));
    let profile = project
        .get_profile("main")
        .unwrap()
        .profile()
        .cloned()
        .expect("profile response");
    (transport, session, project, profile)
}
