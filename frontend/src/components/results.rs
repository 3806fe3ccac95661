//! Result tables: H1 and phone summaries with one row per page, and the
//! performance board.

use leptos::*;
use sitetester_core::render::tabular::{NO_H1_TEXTS, NO_ISSUES, NO_PHONE_NUMBERS};
use sitetester_core::render::performance::NO_AUDITS;
use sitetester_core::render::{H1Row, H1Summary, PerformanceBoard, PhoneRow, PhoneSummary};
use sitetester_core::{H1Result, PhoneResult};

/// Bulleted list, or `empty` when there is nothing to list.
fn bullet_list(items: Vec<String>, empty: &'static str) -> View {
    if items.is_empty() {
        return view! { <span class="muted">{empty}</span> }.into_view();
    }
    view! {
        <ul class="cell-list">
            {items.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
        </ul>
    }
    .into_view()
}

#[component]
fn StatCard(label: &'static str, #[prop(into)] value: String) -> impl IntoView {
    view! {
        <div class="stat-card">
            <div class="stat-value">{value}</div>
            <div class="stat-label">{label}</div>
        </div>
    }
}

#[component]
pub fn H1Results(results: Vec<H1Result>) -> impl IntoView {
    let summary = H1Summary::from_results(&results);
    let rows: Vec<H1Row> = results.iter().map(H1Row::from).collect();

    view! {
        <div class="stats-grid">
            <StatCard label="Pages audited" value=summary.total.to_string()/>
            <StatCard
                label="With H1"
                value=format!("{} ({}%)", summary.with_h1, summary.with_h1_percent())
            />
            <StatCard
                label="Without H1"
                value=format!("{} ({}%)", summary.without_h1, summary.without_h1_percent())
            />
            <StatCard
                label="Multiple H1"
                value=format!("{} ({}%)", summary.multiple_h1, summary.multiple_h1_percent())
            />
            <StatCard label="Average H1/page" value=summary.average_label()/>
        </div>
        <table class="results-table">
            <thead>
                <tr>
                    <th>"URL"</th>
                    <th>"H1 Count"</th>
                    <th>"Status"</th>
                    <th>"H1 Texts"</th>
                    <th>"Issues"</th>
                </tr>
            </thead>
            <tbody>
                {rows
                    .into_iter()
                    .map(|row| {
                        view! {
                            <tr>
                                <td><a href=row.url.clone() target="_blank">{row.url.clone()}</a></td>
                                <td>{row.count}</td>
                                <td><span class=format!("status {}", row.status.css_class())>{row.status.label()}</span></td>
                                <td>{bullet_list(row.texts, NO_H1_TEXTS)}</td>
                                <td>{bullet_list(row.issues, NO_ISSUES)}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

#[component]
pub fn PhoneResults(results: Vec<PhoneResult>) -> impl IntoView {
    let summary = PhoneSummary::from_results(&results);
    let rows: Vec<PhoneRow> = results.iter().map(PhoneRow::from).collect();

    view! {
        <div class="stats-grid">
            <StatCard label="Pages audited" value=summary.total.to_string()/>
            <StatCard
                label="With phone numbers"
                value=format!("{} ({}%)", summary.with_phones, summary.with_phones_percent())
            />
            <StatCard label="Without phone numbers" value=summary.without_phones.to_string()/>
            <StatCard label="Numbers found" value=summary.total_numbers.to_string()/>
            <StatCard label="Average numbers/page" value=summary.average_label()/>
            <StatCard label="Issues/page" value=summary.issues_per_page_label()/>
        </div>
        <table class="results-table">
            <thead>
                <tr>
                    <th>"URL"</th>
                    <th>"Numbers"</th>
                    <th>"Status"</th>
                    <th>"Phone Numbers"</th>
                    <th>"Formats"</th>
                    <th>"Issues"</th>
                </tr>
            </thead>
            <tbody>
                {rows
                    .into_iter()
                    .map(|row| {
                        let numbers = if row.numbers.is_empty() {
                            view! { <span class="muted">{NO_PHONE_NUMBERS}</span> }.into_view()
                        } else {
                            row.numbers
                                .into_iter()
                                .map(|phone| {
                                    view! {
                                        <div class="phone-number">
                                            {phone.number}
                                            {phone.location.map(|location| {
                                                view! { <span class="badge">{location}</span> }
                                            })}
                                        </div>
                                    }
                                })
                                .collect_view()
                        };
                        view! {
                            <tr>
                                <td><a href=row.url.clone() target="_blank">{row.url.clone()}</a></td>
                                <td>{row.count}</td>
                                <td><span class=format!("status {}", row.status.css_class())>{row.status.label()}</span></td>
                                <td>{numbers}</td>
                                <td>{row.formats}</td>
                                <td>{bullet_list(row.issues, NO_ISSUES)}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

/// Performance rows, newest first; updated while the session runs.
#[component]
pub fn PerformanceTable(board: RwSignal<PerformanceBoard>) -> impl IntoView {
    view! {
        <table class="results-table">
            <thead>
                <tr>
                    <th>"URL"</th>
                    <th>"Score"</th>
                    <th>"TTFB"</th>
                    <th>"Page Load"</th>
                </tr>
            </thead>
            <tbody>
                {move || {
                    board.with(|board| {
                        if board.is_empty() {
                            return view! {
                                <tr><td colspan="4" class="muted">{NO_AUDITS}</td></tr>
                            }
                            .into_view();
                        }
                        board
                            .rows()
                            .iter()
                            .map(|row| {
                                view! {
                                    <tr>
                                        <td>{row.url.clone()}</td>
                                        <td><span class=format!("score {}", row.grade.css_class())>{row.score_label()}</span></td>
                                        <td>{row.ttfb.clone()}</td>
                                        <td>{row.page_load.clone()}</td>
                                    </tr>
                                }
                            })
                            .collect_view()
                    })
                }}
            </tbody>
        </table>
    }
}
