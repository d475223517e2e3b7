use dom::traverse::{count_elements, text_content};
use dom::{Document, debug::outline};
use reconciler::{
    Component, Context, Element, EventHandler, Props, RenderResult, Renderer, State, Updater,
};
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

struct Counter {
    updater: Updater,
}

impl Component for Counter {
    fn create(_: &Props, updater: Updater) -> Self {
        Counter { updater }
    }

    fn initial_state(&self) -> State {
        State::new().with("count", 0)
    }

    fn render(&self, cx: &Context<'_>) -> RenderResult {
        let count = cx.state().get_int("count").unwrap_or_default();
        let label = cx.props().get_str("label").unwrap_or("Counter");
        let id = cx.props().get_str("id").unwrap_or("counter");
        let updater = self.updater.clone();
        let on_click = EventHandler::new(move || {
            updater.set_state_with(|s| State::new().with("count", s.get_int("count").unwrap_or_default() + 1))
        });
        let button = Element::host(
            "button",
            Props::new().with("id", id).with("onClick", on_click),
            [Element::text(format!("{label}: {count}"))],
        );
        let children = std::iter::once(button).chain(cx.props().children().iter().cloned());
        Ok(Element::host("div", Props::new().with("className", "counter"), children))
    }
}

fn counter(id: &str, label: &str, children: Vec<Element>) -> Element {
    Element::class::<Counter>(Props::new().with("id", id).with("label", label), children)
}

fn print_tree(doc: &RefCell<Document>) -> Result<(), Box<dyn Error>> {
    let doc = doc.borrow();
    let tree = doc.materialize(doc.root())?;
    println!("{}", doc.inner_html(doc.root()));
    println!(
        "  {} elements, text {:?}",
        count_elements(&tree),
        text_content(&tree)
    );
    for line in outline(&tree, 64) {
        println!("  {line}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let doc = Rc::new(RefCell::new(Document::new()));
    let root = doc.borrow().root();
    let mut renderer = Renderer::new(doc.clone());

    renderer.render(
        counter("outer", "Outer", vec![counter("inner", "Inner", vec![])]),
        root,
    )?;
    println!("# mounted");
    print_tree(&doc)?;

    for id in ["inner", "inner", "outer"] {
        dom::click_element_by_id(&doc, id)?;
        println!("# clicked #{id}");
        print_tree(&doc)?;
    }

    renderer.render(Element::host("p", Props::new(), [Element::text("bye")]), root)?;
    println!("# replaced root");
    print_tree(&doc)?;

    println!("{:?}", renderer.stats());
    Ok(())
}
