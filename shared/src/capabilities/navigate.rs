use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

/// Asks the shell to move the wizard to `route`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigateOperation {
    pub route: String,
}

impl Operation for NavigateOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct Navigator<Ev> {
    context: CapabilityContext<NavigateOperation, Ev>,
}

impl<Ev> Navigator<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<NavigateOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn go_to(&self, route: impl Into<String>)
    where
        Ev: Send,
    {
        let ctx = self.context.clone();
        let operation = NavigateOperation {
            route: route.into(),
        };
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
