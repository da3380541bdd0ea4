//! Robots.txt parser implementation
//!
//! Groups are formed from consecutive `User-agent:` lines; a `User-agent:` line
//! that follows any rule starts a new group. Groups naming our agent token are
//! "specific", `*` groups are "generic", every other group is ignored.

/// Longest `Crawl-delay` honored, in seconds (one day)
const MAX_CRAWL_DELAY: f64 = 86_400.0;

/// A single Allow/Disallow rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Allow(String),
    Disallow(String),
}

/// One User-agent group and the directives that follow it
#[derive(Debug, Clone, Default, PartialEq)]
struct Group {
    /// Lowercased agent names
    agents: Vec<String>,
    rules: Vec<Rule>,
    crawl_delay: Option<f64>,
}

impl Group {
    fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.crawl_delay.is_none()
    }

    fn names_agent(&self, agent: &str) -> bool {
        self.agents.iter().any(|ua| agent_matches(ua, agent))
    }

    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|ua| ua == "*")
    }
}

/// Matches a robots.txt agent name against our token
///
/// Both sides are compared case-insensitively; a token such as
/// `founders25-research/1.0` also matches the bare product name.
fn agent_matches(group_agent: &str, agent: &str) -> bool {
    let agent = agent.to_lowercase();
    let product = agent.split('/').next().unwrap_or(&agent);
    group_agent == agent || group_agent == product
}

/// Parsed robots.txt data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRobots {
    groups: Vec<Group>,
    /// Every non-empty Disallow value, in file order
    disallow_paths: Vec<String>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// Lines that are not `key: value` directives are ignored, so garbage input
    /// degrades to allow-all.
    pub fn from_content(content: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut disallow_paths = Vec::new();
        // Rules before the first User-agent line belong to no agent
        let mut current = Group::default();

        for line in content.lines() {
            let trimmed = line.trim();

            // Skip comments and empty lines
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !current.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                    current.agents.push(value.to_lowercase());
                }
                "disallow" => {
                    if !value.is_empty() {
                        disallow_paths.push(value.to_string());
                    }
                    current.rules.push(Rule::Disallow(value.to_string()));
                }
                "allow" => {
                    current.rules.push(Rule::Allow(value.to_string()));
                }
                "crawl-delay" => {
                    if let Ok(delay) = value.parse::<f64>() {
                        if !(0.0..=MAX_CRAWL_DELAY).contains(&delay) {
                            tracing::warn!("Ignoring out-of-range Crawl-delay: {}", value);
                        } else if current.crawl_delay.is_none() {
                            current.crawl_delay = Some(delay);
                        }
                    }
                }
                _ => {}
            }
        }

        if !current.is_empty() || !current.agents.is_empty() {
            groups.push(current);
        }

        Self {
            groups,
            disallow_paths,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Rules that apply to `agent`: specific groups first, then generic ones
    pub fn applicable_rules(&self, agent: &str) -> Vec<&Rule> {
        let specific = self.groups.iter().filter(|g| g.names_agent(agent));
        let generic = self
            .groups
            .iter()
            .filter(|g| !g.names_agent(agent) && g.is_wildcard());

        specific
            .chain(generic)
            .flat_map(|g| g.rules.iter())
            .collect()
    }

    /// Checks if a URL path is allowed for the given user agent
    ///
    /// Rules are scanned in order and the first one that matches decides. An
    /// empty `Disallow:` allows everything.
    pub fn is_allowed(&self, path: &str, agent: &str) -> bool {
        for rule in self.applicable_rules(agent) {
            match rule {
                Rule::Disallow(prefix) if prefix.is_empty() => return true,
                Rule::Disallow(prefix) if path.starts_with(prefix.as_str()) => return false,
                Rule::Allow(prefix) if !prefix.is_empty() && path.starts_with(prefix.as_str()) => {
                    return true
                }
                _ => {}
            }
        }

        true
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A delay from a group naming the agent wins over a wildcard delay.
    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        let specific = self
            .groups
            .iter()
            .filter(|g| g.names_agent(agent))
            .find_map(|g| g.crawl_delay);

        specific.or_else(|| {
            self.groups
                .iter()
                .filter(|g| g.is_wildcard())
                .find_map(|g| g.crawl_delay)
        })
    }

    /// All Disallow paths in the file, regardless of agent
    pub fn disallow_paths(&self) -> &[String] {
        &self.disallow_paths
    }
}
