//! The deploy scripts and the tag-based runner that sequences them
//!
//! Scripts run in ascending id order, once each, and the first failure
//! aborts the run.

use std::fmt::{self, Display};

use colored::Colorize;
use itertools::Itertools;
use tracing::{debug, error, info};

use crate::{chain::ChainClient, errors::ScriptError, framework::DeployEnv};

mod solvbtc;
mod solvbtc_factory_product;
mod yield_token_factory;

pub use solvbtc::SOLVBTC_PROXY_NAME;

/// The deploy scripts in this repository
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Script {
    /// Deploy a SolvBTC product proxy through the SolvBTC factory, then run
    /// its second initializer
    SolvBtcFactoryProduct,
    /// Deploy or upgrade the SolvBTC proxy
    SolvBtc,
    /// Deploy the SolvBTC yield token factory at its deterministic address
    YieldTokenFactory,
}

impl Script {
    /// Every script, in execution order
    pub const ALL: [Script; 3] =
        [Script::SolvBtcFactoryProduct, Script::SolvBtc, Script::YieldTokenFactory];

    /// The id ordering the script among the others
    pub fn id(&self) -> u32 {
        match self {
            Script::SolvBtcFactoryProduct => 1204,
            Script::SolvBtc => 10004,
            Script::YieldTokenFactory => 20002,
        }
    }

    /// The tags selecting the script
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Script::SolvBtcFactoryProduct | Script::SolvBtc => &["SolvBTC"],
            Script::YieldTokenFactory => &["SolvBTCYTFactory"],
        }
    }

    /// Run the script against the given environment
    pub async fn run<C: ChainClient>(&self, env: &mut DeployEnv<C>) -> Result<(), ScriptError> {
        match self {
            Script::SolvBtcFactoryProduct => {
                solvbtc_factory_product::deploy_solvbtc_factory_product(env).await
            }
            Script::SolvBtc => solvbtc::deploy_solvbtc(env).await,
            Script::YieldTokenFactory => yield_token_factory::deploy_yield_token_factory(env).await,
        }
    }
}

impl Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Script::SolvBtcFactoryProduct => write!(f, "deploy-solvbtc-factory-product"),
            Script::SolvBtc => write!(f, "deploy-solvbtc"),
            Script::YieldTokenFactory => write!(f, "deploy-solvbtc-yt-factory"),
        }
    }
}

/// The lifecycle of a script within a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Selected but not started
    Pending,
    /// Executing
    Running,
    /// Finished successfully
    Completed,
    /// Aborted with an error
    Failed,
}

/// Select the scripts carrying any of `tags`, in execution order.
///
/// No tags selects every script. A tag no script carries is an error.
pub fn select_scripts(tags: &[String]) -> Result<Vec<Script>, ScriptError> {
    if tags.is_empty() {
        return Ok(Script::ALL.to_vec());
    }

    let unknown: Vec<String> = tags
        .iter()
        .filter(|tag| !Script::ALL.iter().any(|s| s.tags().contains(&tag.as_str())))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ScriptError::UnknownTags(unknown));
    }

    Ok(Script::ALL
        .into_iter()
        .filter(|s| s.tags().iter().any(|t| tags.iter().any(|tag| tag == t)))
        .sorted_by_key(Script::id)
        .collect())
}

/// Run every script carrying any of `tags`, stopping at the first failure.
///
/// Returns the final state of each selected script.
pub async fn run_tags<C: ChainClient>(
    env: &mut DeployEnv<C>,
    tags: &[String],
) -> Result<Vec<(Script, RunState)>, ScriptError> {
    let scripts = select_scripts(tags)?;
    let mut states: Vec<(Script, RunState)> =
        scripts.iter().map(|s| (*s, RunState::Pending)).collect();
    info!(
        "running {} on {}",
        scripts.iter().map(|s| s.to_string()).join(", "),
        env.network().red()
    );

    for i in 0..states.len() {
        let script = states[i].0;
        states[i].1 = RunState::Running;
        info!(id = script.id(), "running {script}");

        if let Err(e) = script.run(env).await {
            states[i].1 = RunState::Failed;
            error!(id = script.id(), "{script} failed: {e}");
            debug!("run summary: {states:?}");
            return Err(e);
        }
        states[i].1 = RunState::Completed;
    }

    Ok(states)
}
