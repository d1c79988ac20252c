//! Validated spark-submit argument strings.
//!
//! Flattens structured [`SparkSubmitParameters`] into the argument string a
//! spark-submit job driver expects:
//!
//! ```text
//! --master <m> --deploy-mode <d> --class <c> [--conf <v>]* --packages <p>
//! ```
//!
//! Field values are copied verbatim; only the finished string is trimmed.

mod error;
mod params;

pub use error::SubmitCommandError;
pub use params::SparkSubmitParameters;

const MASTER_FLAG: &str = "--master";
const DEPLOY_MODE_FLAG: &str = "--deploy-mode";
const CLASS_FLAG: &str = "--class";
const CONF_FLAG: &str = "--conf";
const PACKAGES_FLAG: &str = "--packages";

/// Build the spark-submit argument string.
///
/// Checks run in a fixed order and stop at the first violation: master,
/// deploy mode, class, each conf directive in order, then packages.
pub fn build_command(params: &SparkSubmitParameters) -> Result<String, SubmitCommandError> {
    if params.master.is_empty() {
        return Err(SubmitCommandError::MissingParameter("master"));
    }
    if params.deploy_mode.is_empty() {
        return Err(SubmitCommandError::MissingParameter("deploy_mode"));
    }
    if params.class.is_empty() {
        return Err(SubmitCommandError::MissingParameter("class"));
    }

    let mut command = String::new();
    push_flag(&mut command, MASTER_FLAG, &params.master);
    push_flag(&mut command, DEPLOY_MODE_FLAG, &params.deploy_mode);
    push_flag(&mut command, CLASS_FLAG, &params.class);

    for conf in &params.conf {
        if conf.is_empty() {
            return Err(SubmitCommandError::EmptyConf);
        }
        push_flag(&mut command, CONF_FLAG, conf);
    }

    if params.packages.is_empty() {
        return Err(SubmitCommandError::MissingParameter("packages"));
    }
    push_flag(&mut command, PACKAGES_FLAG, &params.packages);

    Ok(command.trim().to_string())
}

fn push_flag(command: &mut String, flag: &str, value: &str) {
    command.push_str(flag);
    command.push(' ');
    command.push_str(value);
    command.push(' ');
}
