use std::io::Write;

use ledger::{
    Gateway, Item, ItemFields, OtherCost, OtherCostFields, Session,
    view::{self, ViewParams},
};

use crate::{
    error::{AppError, Result},
    render,
    settings::{Command, CostCommand, ItemCommand, ListArgs},
};

/// Run one command for the signed-in user of `session`.
pub async fn run<G: Gateway>(
    session: &mut Session<G>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    let user_id = session
        .user_id()
        .map(str::to_string)
        .ok_or_else(|| AppError::Usage("not signed in".to_string()))?;

    match command {
        Command::List(args) => list(session, &args, out)?,
        Command::Analytics => {
            let analytics = view::analytics(session.store().ledger());
            render::analytics(out, &analytics)?;
        }
        Command::Item(args) => item(session, &user_id, args.command, out).await?,
        Command::Cost(args) => cost(session, &user_id, args.command, out).await?,
    }
    Ok(())
}

fn list<G: Gateway>(session: &Session<G>, args: &ListArgs, out: &mut impl Write) -> Result<()> {
    let params = ViewParams {
        sort_key: args.sort,
        sort_order: args.order,
        threshold: args.threshold,
    };
    let dashboard = view::dashboard(session.store().ledger(), &params);
    render::dashboard(out, session.display_name(), &dashboard)?;
    Ok(())
}

async fn item<G: Gateway>(
    session: &mut Session<G>,
    user_id: &str,
    command: ItemCommand,
    out: &mut impl Write,
) -> Result<()> {
    let store = session.store_mut();
    match command {
        ItemCommand::Add { name, cost } => {
            let item = store
                .add::<Item>(user_id, ItemFields::new(name, cost))
                .await
                .inspect_err(|err| tracing::error!("failed to add item: {err}"))?;
            writeln!(out, "Item added: {}", item.id)?;
        }
        ItemCommand::Update { id, name, cost } => {
            store
                .update::<Item>(user_id, &id, ItemFields::new(name, cost))
                .await
                .inspect_err(|err| tracing::error!("failed to update item {id}: {err}"))?;
            writeln!(out, "Item updated: {id}")?;
        }
        ItemCommand::Delete { id } => {
            store
                .delete::<Item>(user_id, &id)
                .await
                .inspect_err(|err| tracing::error!("failed to delete item {id}: {err}"))?;
            writeln!(out, "Item deleted: {id}")?;
        }
    }
    Ok(())
}

async fn cost<G: Gateway>(
    session: &mut Session<G>,
    user_id: &str,
    command: CostCommand,
    out: &mut impl Write,
) -> Result<()> {
    let store = session.store_mut();
    match command {
        CostCommand::Add {
            description,
            amount,
        } => {
            let cost = store
                .add::<OtherCost>(user_id, OtherCostFields::new(description, amount))
                .await
                .inspect_err(|err| tracing::error!("failed to add other cost: {err}"))?;
            writeln!(out, "Other cost added: {}", cost.id)?;
        }
        CostCommand::Update {
            id,
            description,
            amount,
        } => {
            store
                .update::<OtherCost>(user_id, &id, OtherCostFields::new(description, amount))
                .await
                .inspect_err(|err| tracing::error!("failed to update other cost {id}: {err}"))?;
            writeln!(out, "Other cost updated: {id}")?;
        }
        CostCommand::Delete { id } => {
            store
                .delete::<OtherCost>(user_id, &id)
                .await
                .inspect_err(|err| tracing::error!("failed to delete other cost {id}: {err}"))?;
            writeln!(out, "Other cost deleted: {id}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ledger::{
        GatewayError, LedgerError, LedgerStore, User,
        memory::{MemoryGateway, Operation},
        view::{SortKey, SortOrder},
    };

    use super::*;
    use crate::settings::{CostArgs, ItemArgs};

    async fn signed_in() -> Session<MemoryGateway> {
        let mut session = Session::new(LedgerStore::builder(MemoryGateway::new()).build());
        session
            .on_user_changed(Some(User::new("uid-1").display_name("Ada")))
            .await
            .unwrap();
        session
    }

    async fn exec(session: &mut Session<MemoryGateway>, command: Command) -> Result<String> {
        let mut out = Vec::new();
        run(session, command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn add_item(name: &str, cost: f64) -> Command {
        Command::Item(ItemArgs {
            command: ItemCommand::Add {
                name: name.to_string(),
                cost,
            },
        })
    }

    #[tokio::test]
    async fn list_applies_threshold_to_items_only() {
        let mut session = signed_in().await;
        exec(&mut session, add_item("Pen", 2.0)).await.unwrap();
        exec(&mut session, add_item("Laptop", 1200.0)).await.unwrap();
        exec(
            &mut session,
            Command::Cost(CostArgs {
                command: CostCommand::Add {
                    description: "Stamp".to_string(),
                    amount: 1.0,
                },
            }),
        )
        .await
        .unwrap();

        let text = exec(
            &mut session,
            Command::List(ListArgs {
                sort: SortKey::Cost,
                order: SortOrder::Descending,
                threshold: 10.0,
            }),
        )
        .await
        .unwrap();

        assert!(text.starts_with("Welcome, Ada"));
        assert!(text.contains("Laptop"));
        assert!(!text.contains("Pen"));
        assert!(text.contains("Stamp"));
        assert!(text.contains("1203.00"));
    }

    #[tokio::test]
    async fn invalid_item_is_reported_as_validation_error() {
        let mut session = signed_in().await;

        let err = exec(&mut session, add_item("Pen", -1.0)).await.unwrap_err();

        assert!(matches!(err, AppError::Ledger(LedgerError::Validation(_))));
        assert!(session.store().items().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_is_propagated() {
        let mut session = signed_in().await;
        session
            .store()
            .gateway()
            .fail(Operation::Delete, GatewayError::Server("down".to_string()))
            .await;

        let err = exec(
            &mut session,
            Command::Cost(CostArgs {
                command: CostCommand::Delete {
                    id: "x".to_string(),
                },
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Ledger(LedgerError::Remote(_))));
    }

    #[tokio::test]
    async fn analytics_ranks_items() {
        let mut session = signed_in().await;
        for (name, cost) in [("A", 1.0), ("B", 5.0), ("C", 3.0)] {
            exec(&mut session, add_item(name, cost)).await.unwrap();
        }

        let text = exec(&mut session, Command::Analytics).await.unwrap();

        let b = text.find("  B ").unwrap();
        let c = text.find("  C ").unwrap();
        let a = text.find("  A ").unwrap();
        assert!(b < c && c < a);
        assert!(text.contains("Items total:               9.00"));
    }

    #[tokio::test]
    async fn mutations_run_after_a_failed_initial_fetch() {
        let gateway = MemoryGateway::new();
        gateway
            .fail(Operation::List, GatewayError::Server("down".to_string()))
            .await;
        let mut session = Session::new(LedgerStore::builder(gateway).build());
        let fetched = session.on_user_changed(Some(User::new("uid-1"))).await;
        assert!(fetched.is_err());

        let command = add_item("Pen", 2.0);
        assert!(!command.reads_ledger());
        let text = exec(&mut session, command).await.unwrap();

        assert!(text.starts_with("Item added: "));
        assert_eq!(session.store().items().len(), 1);
    }

    #[tokio::test]
    async fn commands_require_a_user() {
        let mut session = Session::new(LedgerStore::builder(MemoryGateway::new()).build());
        let err = exec(&mut session, Command::Analytics).await.unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
    }
}
