use crate::command::domain::{CommandAction, CommandOutcome};
use anyhow::Result;
use grantscope_protocol::COMMAND_API_VERSION;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Capabilities {
    server: CapabilitiesServer,
    command_api_version: u32,
    actions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct CapabilitiesServer {
    name: &'static str,
    version: &'static str,
}

pub(crate) struct CapabilitiesService;

impl CapabilitiesService {
    pub fn run(&self) -> Result<CommandOutcome> {
        CommandOutcome::from_value(Capabilities {
            server: CapabilitiesServer {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
            command_api_version: COMMAND_API_VERSION,
            actions: CommandAction::ALL.iter().map(|action| action.as_str()).collect(),
        })
    }
}
