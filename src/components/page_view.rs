use yew::prelude::*;

use crate::dom::BREADCRUMB_SEPARATOR;
use crate::lists;
use crate::view::{NavLink, View};

#[derive(Properties, PartialEq, Clone)]
pub struct PageViewProps {
    pub view: View,
}

fn nav_link(link: &NavLink) -> Html {
    let target = link.target.clone();
    let onclick = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        lists::follow_in_browser(&target);
    });
    html! { <a href="#" id={link.id.clone()} {onclick}>{ link.label.clone() }</a> }
}

#[function_component(PageView)]
pub fn page_view(props: &PageViewProps) -> Html {
    match &props.view {
        View::Options(options) => html! {
            <>
                { for options.iter().map(|o| html! {
                    <option value={o.value.clone()}>{ o.label.clone() }</option>
                })}
            </>
        },
        View::Links(links) => html! {
            <>
                { for links.iter().map(|link| html! {
                    <>{ nav_link(link) }<br /></>
                })}
            </>
        },
        View::Modules(entries) => html! {
            <>
                { for entries.iter().map(|entry| html! {
                    <>
                        { nav_link(&entry.learn) }
                        { for entry.downloads.iter().map(|d| html! {
                            <a href={d.href.clone()} download={d.file_name.clone()}>{ d.label.clone() }</a>
                        })}
                        <br />
                    </>
                })}
            </>
        },
        View::UnitCheckboxes(boxes) => html! {
            <>
                { for boxes.iter().map(|cb| html! {
                    <>
                        <input id={cb.input_id()} type="checkbox" value={cb.unit_id.clone()} checked={cb.checked} />
                        <label for={cb.input_id()}>{ cb.name.clone() }</label>
                    </>
                })}
            </>
        },
        View::Crumbs(crumbs) => html! {
            <>
                { for crumbs.iter().enumerate().map(|(i, c)| html! {
                    <>
                        { if i > 0 { html! { { BREADCRUMB_SEPARATOR } } } else { html! {} } }
                        <a href={c.href.clone()}>{ c.name.clone() }</a>
                    </>
                })}
            </>
        },
        View::Notice { text, is_error: true } => html! { <font style="color:red;">{ text.clone() }</font> },
        View::Notice { text, .. } | View::Text(text) => html! { <>{ text.clone() }</> },
    }
}
