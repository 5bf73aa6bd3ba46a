//! Default configuration values

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

/// Annotated configuration file written by `config init`
pub fn template() -> &'static str {
    r#"# crossgraph configuration
server:
  # Address the GraphQL endpoint listens on
  listen: 127.0.0.1:8080
  # Serve GraphiQL at /
  playground: true
events:
  # The cluster-wide event feed stops once it holds this many warnings
  globalEventsTarget: 500
  # ...or this many events, whichever comes first
  globalEventsCap: 1000
kubernetes:
  # Deadline for the API calls of a single field
  requestTimeoutSecs: 10
  retry:
    maxAttempts: 5
    initialBackoffMillis: 100
    maxBackoffMillis: 2000
    multiplier: 2.0
"#
}
