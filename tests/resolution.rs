//! Resolution properties over generated page declarations.
//!
//! Run with: cargo test --test resolution

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{Value, json};

use pageobject_core::page::{ElementDeclaration, ElementDeclarations};
use pageobject_core::{
    Arg, Client, CommandDefinition, CommandEntry, CommandMap, CommandQueue, Element, Error, Page,
    PageDefinition, Result, SectionDefinition,
};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Default)]
struct QueueClient {
    queue: CommandQueue,
}

#[async_trait]
impl Client for QueueClient {
    async fn send(&self, _method: &str, params: Value) -> Result<Value> {
        Ok(params)
    }

    fn enqueue(&self, command: &str, task: BoxFuture<'static, Result<Value>>) {
        self.queue.push(command, task);
    }
}

type Received = Arc<Mutex<Vec<Arg>>>;

fn build(definition: PageDefinition, client: Arc<QueueClient>) -> (Page, Received) {
    let received = Received::default();
    let sink = Arc::clone(&received);

    let page = Page::builder("generated")
        .client(client)
        .definition(definition)
        .commands(move |_| {
            let sink = Arc::clone(&sink);
            let click = CommandDefinition::sync(move |_, args| {
                sink.lock().extend(args.into_iter().take(1));
                Ok(Value::Null)
            });
            Ok(CommandMap::from([("click".to_string(), CommandEntry::from(click))]))
        })
        .build()
        .expect("generated page builds");

    (page, received)
}

fn declarations(elements: &BTreeMap<String, String>) -> ElementDeclarations {
    ElementDeclarations::Map(
        elements
            .iter()
            .map(|(name, selector)| (name.clone(), ElementDeclaration::from(selector.as_str())))
            .collect(),
    )
}

fn resolved(received: &Received) -> Element {
    match received.lock().pop() {
        Some(Arg::Element(element)) => element,
        other => panic!("Expected a resolved element, got {other:?}"),
    }
}

fn element_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z][a-zA-Z0-9]{0,8}", "[.#]?[a-z][a-z0-9-]{0,10}", 1..6)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn declared_page_elements_resolve_to_declaration(elements in element_map()) {
        let definition = PageDefinition {
            elements: declarations(&elements),
            ..PageDefinition::default()
        };
        let (page, received) = build(definition, Arc::new(QueueClient::default()));

        for (name, selector) in &elements {
            page.call("click", vec![format!("@{name}").into()]).unwrap();
            let element = resolved(&received);
            prop_assert_eq!(element.selector_str(), Some(selector.as_str()));
            prop_assert_eq!(element.locate_strategy(), None);
            prop_assert_eq!(element.pseudo_selector(), None);

            page.call("click", vec![format!("@{name}:visible").into()]).unwrap();
            let pseudo = resolved(&received);
            prop_assert_eq!(pseudo.pseudo_selector(), Some("visible"));
        }
    }

    #[test]
    fn section_elements_resolve_to_chains(elements in element_map()) {
        let mut section = SectionDefinition::new(".generated");
        section.elements = declarations(&elements);
        let definition = PageDefinition {
            sections: BTreeMap::from([("panel".to_string(), section)]),
            ..PageDefinition::default()
        };
        let (page, received) = build(definition, Arc::new(QueueClient::default()));
        let panel = page.section("panel").unwrap();

        for (name, selector) in &elements {
            let reference = format!("@{name}");
            panel.call("click", vec![reference.as_str().into()]).unwrap();
            let first = resolved(&received);
            panel.call("click", vec![reference.as_str().into()]).unwrap();
            let second = resolved(&received);

            prop_assert_eq!(&first, &second);
            let chain = first.chain().unwrap();
            prop_assert_eq!(chain.len(), 2);
            prop_assert_eq!(chain[0].selector_str(), Some(".generated"));
            prop_assert_eq!(chain[1].selector_str(), Some(selector.as_str()));
        }
    }

    #[test]
    fn undeclared_names_list_every_declaration(elements in element_map()) {
        let definition = PageDefinition {
            elements: declarations(&elements),
            ..PageDefinition::default()
        };
        let (page, received) = build(definition, Arc::new(QueueClient::default()));

        let err = page.call("click", vec!["@_undeclared".into()]).unwrap_err();
        match err {
            Error::ElementNotFound { available, .. } => {
                let declared: Vec<String> = elements.keys().cloned().collect();
                prop_assert_eq!(available, declared);
            }
            other => prop_assert!(false, "unexpected error {:?}", other),
        }
        prop_assert!(received.lock().is_empty());
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn section_literal_builds_two_element_chain() -> anyhow::Result<()> {
    let definition = PageDefinition::from_json(r#"{ "sections": { "footer": { "selector": ".footer" } } }"#)?;
    let (page, received) = build(definition, Arc::new(QueueClient::default()));

    page.section("footer")?.call("click", vec!["button".into()])?;

    let element = resolved(&received);
    anyhow::ensure!(element.is_recursive(), "expected a recursive chain");
    assert_eq!(element.to_string(), ".footer > button");
    Ok(())
}

#[test]
fn detached_section_futures_run_in_order() -> anyhow::Result<()> {
    let client = Arc::new(QueueClient::default());
    let page = Page::builder("queued")
        .client(client.clone())
        .definition(PageDefinition::from_json(
            r#"{ "sections": { "list": { "selector": "ul", "elements": { "item": "li" } } } }"#,
        )?)
        .commands(|_| {
            let fetch = CommandDefinition::future(|ctx, args| async move {
                let payload = args.first().map(Arg::to_value).unwrap_or_default();
                ctx.client().send("fetch", payload).await
            });
            Ok(CommandMap::from([("fetch".to_string(), CommandEntry::from(fetch))]))
        })
        .build()?;

    let list = page.section("list")?;
    list.call("fetch", vec!["@item".into()])?
        .call("fetch", vec![Arg::from(json!({ "selector": "li.last" }))])?;
    assert_eq!(client.queue.len(), 2);

    let results = tokio_test::block_on(client.queue.run());
    let selectors: Vec<Value> = results
        .into_iter()
        .map(|(_, result)| result.map(|value| value["selector"][1]["selector"].clone()))
        .collect::<Result<_>>()?;
    assert_eq!(selectors, vec![Value::from("li"), Value::from("li.last")]);
    Ok(())
}
