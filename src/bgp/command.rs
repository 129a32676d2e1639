//! Route command rendering.
//!
//! The speaker's text API accepts exactly two verbs for our purposes:
//! ```text
//! announce route <CIDR> next-hop self
//! withdraw route <CIDR> next-hop self
//! ```

use std::fmt;

use crate::bgp::route::RouteSpec;

/// What the speaker should do with a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteAction {
    Announce,
    Withdraw,
}

impl RouteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteAction::Announce => "announce",
            RouteAction::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single command line, without the trailing newline.
#[derive(Debug, Clone, Copy)]
pub struct RouteCommand<'a> {
    action: RouteAction,
    route: &'a RouteSpec,
}

impl<'a> RouteCommand<'a> {
    pub fn new(action: RouteAction, route: &'a RouteSpec) -> Self {
        Self { action, route }
    }

    /// Render the command terminated by `\n`, ready for the channel.
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for RouteCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // RouteSpec guarantees next-hop self
        write!(f, "{} route {} next-hop self", self.action, self.route.prefix())
    }
}
