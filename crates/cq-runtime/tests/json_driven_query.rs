//! End-to-end: breakpoint configuration and size reports arrive as JSON, the
//! way a browser bridge would hand them over, and drive a container query
//! through the public traits only.

use std::cell::RefCell;
use std::rc::Rc;

use cq_core::ElementHandle;
use cq_core::report_parser::parse_size_reports;
use cq_layout::BreakpointSpec;
use cq_runtime::{
    ContainerQuery, EffectHost, ElementSizeObserver, HostEnvironment, NotificationSource,
    ObserveOptions, QueryOptions, ReportCallback, ResizeEntry, SourceFactory,
};
use pretty_assertions::assert_eq;
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
struct Node(&'static str);

impl ElementHandle for Node {}

#[derive(Default)]
struct Bridge {
    callback: RefCell<Option<ReportCallback<Node>>>,
    observed: RefCell<Vec<Node>>,
}

impl Bridge {
    /// Deliver a JSON batch for `node` the way the host would.
    fn push(&self, node: &Node, json: &str) {
        let reports = parse_size_reports(json).unwrap();
        let entries: Vec<_> = reports
            .into_iter()
            .map(|r| ResizeEntry::new(node.clone(), r))
            .collect();
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(&entries);
        }
    }
}

struct BridgeSource(Rc<Bridge>);

impl NotificationSource<Node> for BridgeSource {
    fn observe(&mut self, target: &Node, options: ObserveOptions) {
        assert_eq!(options, ObserveOptions::border_box());
        self.0.observed.borrow_mut().push(target.clone());
    }

    fn unobserve(&mut self, target: &Node) {
        self.0.observed.borrow_mut().retain(|n| n != target);
    }

    fn disconnect(&mut self) {
        self.0.observed.borrow_mut().clear();
    }
}

struct BridgeFactory(Rc<Bridge>);

impl SourceFactory<Node> for BridgeFactory {
    type Source = BridgeSource;

    fn create(&self, callback: ReportCallback<Node>) -> BridgeSource {
        *self.0.callback.borrow_mut() = Some(callback);
        BridgeSource(Rc::clone(&self.0))
    }
}

const BREAKPOINTS: &str = r#"{
    "breakpoints": [{"small": 300}, {"med": 600}, {"large": 900}],
    "valueType": "max"
}"#;

#[test]
fn json_configuration_and_reports() {
    init_tracing();
    let spec: BreakpointSpec = serde_json::from_str(BREAKPOINTS).unwrap();
    let bridge = Rc::new(Bridge::default());
    let query = ContainerQuery::new(
        &QueryOptions::new(spec),
        BridgeFactory(Rc::clone(&bridge)),
        EffectHost::new(HostEnvironment::headless()),
    )
    .unwrap();

    let card = Node("card");
    query.assign_ref().call(Some(card.clone()));
    assert_eq!(*bridge.observed.borrow(), vec![card.clone()]);

    bridge.push(
        &card,
        r#"[{"borderBoxSize": [{"inlineSize": 420.6, "blockSize": 80}],
             "contentRect": {"x": 0, "y": 0, "width": 400, "height": 60}}]"#,
    );
    assert_eq!(&*query.active(), "med");
    assert_eq!(query.width(), 421);

    bridge.push(
        &card,
        r#"{"contentRect": {"x": 0, "y": 0, "width": 1200, "height": 90}}"#,
    );
    assert_eq!(&*query.active(), "max");
    assert_eq!(query.height(), 90);

    query.teardown();
    assert!(bridge.observed.borrow().is_empty());
    bridge.push(
        &card,
        r#"{"contentRect": {"x": 0, "y": 0, "width": 10, "height": 10}}"#,
    );
    assert_eq!(&*query.active(), "max");
}

#[test]
fn element_observer_from_json() {
    init_tracing();
    let bridge = Rc::new(Bridge::default());
    let observer = ElementSizeObserver::new(BridgeFactory(Rc::clone(&bridge)));
    let panel = Node("panel");
    observer.attach(Some(panel.clone()));

    bridge.push(
        &panel,
        r#"{"borderBoxSize": {"inlineSize": 33.5, "blockSize": 12.49},
            "contentRect": {"x": 0, "y": 0, "width": 30, "height": 10}}"#,
    );
    assert_eq!(observer.width(), Some(34));
    assert_eq!(observer.height(), Some(12));
}
