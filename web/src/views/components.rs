//! Reusable page fragments: property cards, the booking wizard and the list
//! tables shared by the dashboard and admin areas.

use crate::backend::models::{
    Booking, BookingStatus, PaymentVerification, Property, Transaction, TransactionStatus,
    TransactionType,
};
use crate::services::booking_flow::{BookingFlow, BookingStep};
use crate::utils::{escape_html, format_money};
use crate::views::empty_state;
use crate::views::icons::Icon;
use chrono::{DateTime, Utc};

const PLACEHOLDER_IMAGE: &str = "/static/placeholder.svg";
const CARD_FEATURES: usize = 4;

fn price_label(property: &Property) -> String {
    format!(
        "{} / {}",
        format_money(&property.price.currency, property.price.amount),
        escape_html(&property.price.duration)
    )
}

fn date_label(date: &Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn feature_list(features: &[String], limit: usize) -> String {
    features
        .iter()
        .take(limit)
        .map(|f| {
            format!(
                r#"<li class="feature">{}<span>{}</span></li>"#,
                Icon::from_key(f).render(),
                escape_html(f)
            )
        })
        .collect()
}

/// Cover image with the low-resolution placeholder as background while the
/// full image loads.
fn cover(property: &Property) -> String {
    match property.cover_image() {
        Some(image) => {
            let placeholder = image.placeholder.as_deref().unwrap_or(PLACEHOLDER_IMAGE);
            format!(
                r#"<img class="cover" src="{}" alt="{}" loading="lazy" style="background-image:url('{}')">"#,
                escape_html(&image.url),
                escape_html(&property.title),
                escape_html(placeholder)
            )
        }
        None => format!(
            r#"<img class="cover" src="{}" alt="{}">"#,
            PLACEHOLDER_IMAGE,
            escape_html(&property.title)
        ),
    }
}

pub fn property_card(property: &Property) -> String {
    let verified = if property.is_verified {
        format!(r#"<span class="badge verified">{} Verified</span>"#, Icon::Verified.glyph())
    } else {
        String::new()
    };

    format!(
        r#"<article class="property-card">
    <a href="/properties/{id}">{cover}</a>
    <div class="card-body">
        <span class="badge">{kind}</span>{verified}
        <h3><a href="/properties/{id}">{title}</a></h3>
        <p class="location">{location_icon} {location}</p>
        <p class="price">{price}</p>
        <p class="rooms">{bed} {beds} &middot; {bath} {baths}</p>
        <ul class="features">{features}</ul>
        <a class="button" href="/properties/{id}#book">Book now</a>
    </div>
</article>"#,
        id = escape_html(&property.id),
        cover = cover(property),
        kind = property.property_type,
        verified = verified,
        title = escape_html(&property.title),
        location_icon = Icon::Location.glyph(),
        location = escape_html(&property.location),
        price = price_label(property),
        bed = Icon::Bed.glyph(),
        beds = property.beds,
        bath = Icon::Bath.glyph(),
        baths = property.baths,
        features = feature_list(&property.features, CARD_FEATURES),
    )
}

pub fn property_grid(properties: &[Property], empty_message: &str) -> String {
    if properties.is_empty() {
        return empty_state(empty_message);
    }
    let cards: String = properties.iter().map(|p| property_card(p)).collect();
    format!(r#"<section class="property-grid">{}</section>"#, cards)
}

/// Full property page body, without the booking wizard.
pub fn property_detail(property: &Property) -> String {
    let gallery: String = property
        .images
        .iter()
        .map(|image| {
            format!(
                r#"<img src="{}" alt="{}" loading="lazy">"#,
                escape_html(&image.url),
                escape_html(&property.title)
            )
        })
        .collect();
    let gallery = if gallery.is_empty() { cover(property) } else { gallery };

    let video = property
        .video
        .as_ref()
        .map(|v| {
            format!(
                r#"<video class="tour" controls preload="metadata" src="{}"></video>"#,
                escape_html(&v.url)
            )
        })
        .unwrap_or_default();

    let availability = if property.is_available {
        r#"<span class="badge available">Available</span>"#
    } else {
        r#"<span class="badge unavailable">Not available</span>"#
    };

    format!(
        r#"<section class="property-detail">
    <div class="gallery">{gallery}</div>
    {video}
    <header>
        <h1>{title}</h1>
        <p class="location">{location_icon} {location}</p>
        <p class="price">{price}</p>
        {availability}
    </header>
    <p class="rooms">{bed} {beds} beds &middot; {bath} {baths} baths</p>
    <div class="description">{description}</div>
    <h2>Features</h2>
    <ul class="features">{features}</ul>
</section>"#,
        gallery = gallery,
        video = video,
        title = escape_html(&property.title),
        location_icon = Icon::Location.glyph(),
        location = escape_html(&property.location),
        price = price_label(property),
        availability = availability,
        bed = Icon::Bed.glyph(),
        beds = property.beds,
        bath = Icon::Bath.glyph(),
        baths = property.baths,
        description = escape_html(&property.description),
        features = feature_list(&property.features, usize::MAX),
    )
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        name,
        escape_html(value)
    )
}

fn step_value(step: BookingStep) -> &'static str {
    match step {
        BookingStep::Options => "options",
        BookingStep::Pay => "pay",
        BookingStep::Owner => "owner",
    }
}

/// Booking wizard for one property. The current step and everything typed so
/// far travel in the form, so going back and forth never loses input.
pub fn booking_wizard(flow: &BookingFlow, property: &Property, action_path: &str) -> String {
    let form = &flow.form;
    let carried = [
        hidden("step", step_value(flow.step)),
        hidden("full_name", &form.full_name),
        hidden("email", &form.email),
        hidden("phone_number", &form.phone_number),
        hidden("check_in", &form.check_in),
        hidden("check_out", &form.check_out),
    ];

    let body = match flow.step {
        BookingStep::Options => format!(
            r#"{}
    <p>How would you like to proceed?</p>
    <button type="submit" name="action" value="pay_now">Pay now</button>
    <button class="secondary" type="submit" name="action" value="contact_owner">Contact owner</button>"#,
            carried.concat()
        ),
        BookingStep::Pay => {
            let nights = form
                .nights()
                .map(|n| {
                    format!(
                        r#"<p class="estimate">{} night(s) at {}</p>"#,
                        n,
                        price_label(property)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"{step}
    {errors}
    <label>Full name <input name="full_name" value="{full_name}" required></label>
    <label>Email <input type="email" name="email" value="{email}" required></label>
    <label>Phone number <input type="tel" name="phone_number" value="{phone}" required></label>
    <label>Check-in <input type="date" name="check_in" value="{check_in}" required></label>
    <label>Check-out <input type="date" name="check_out" value="{check_out}" required></label>
    {nights}
    <button class="secondary" type="submit" name="action" value="back" formnovalidate>Back</button>
    <button type="submit" name="action" value="submit">Proceed to payment</button>"#,
                step = carried[0],
                errors = crate::views::error_list(&flow.errors),
                full_name = escape_html(&form.full_name),
                email = escape_html(&form.email),
                phone = escape_html(&form.phone_number),
                check_in = escape_html(&form.check_in),
                check_out = escape_html(&form.check_out),
                nights = nights,
            )
        }
        BookingStep::Owner => {
            let contact = match &property.owner {
                Some(owner) => format!(
                    r#"<dl class="owner">
        <dt>Name</dt><dd>{}</dd>
        <dt>Email</dt><dd><a href="mailto:{}">{}</a></dd>
        <dt>Phone</dt><dd>{}</dd>
    </dl>"#,
                    escape_html(&owner.name),
                    escape_html(&owner.email),
                    escape_html(&owner.email),
                    escape_html(owner.phone_number.as_deref().unwrap_or("-"))
                ),
                None => empty_state("The owner has not shared contact details."),
            };
            format!(
                r#"{}
    {}
    <button class="secondary" type="submit" name="action" value="back">Back</button>"#,
                carried.concat(),
                contact
            )
        }
    };

    format!(
        r#"<section class="booking-wizard" id="book">
<h2>Book this property</h2>
<form method="post" action="{}">
    {}
</form>
</section>"#,
        escape_html(action_path),
        body
    )
}

fn booking_status_badge(status: BookingStatus) -> String {
    format!(
        r#"<span class="status status-{0}">{0}</span>"#,
        status.as_str()
    )
}

fn transaction_status_badge(status: TransactionStatus) -> String {
    format!(
        r#"<span class="status status-{0}">{0}</span>"#,
        status.as_str()
    )
}

/// Property list for the dashboard (`manage` adds edit/delete controls) and
/// the admin area.
pub fn properties_table(properties: &[Property], manage: bool) -> String {
    if properties.is_empty() {
        return empty_state("No properties yet.");
    }

    let rows: String = properties
        .iter()
        .map(|p| {
            let actions = if manage {
                format!(
                    r#"<td class="actions"><a href="/dashboard/properties/{id}/edit">Edit</a>
<form method="post" action="/dashboard/properties/{id}/delete"><button class="link danger" type="submit">Delete</button></form></td>"#,
                    id = escape_html(&p.id)
                )
            } else {
                format!(
                    r#"<td class="actions"><a href="/properties/{}">View</a></td>"#,
                    escape_html(&p.id)
                )
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
                escape_html(&p.title),
                escape_html(&p.location),
                p.property_type,
                price_label(p),
                if p.is_available { "Available" } else { "Unavailable" },
                p.booking_stats.total_bookings,
                actions
            )
        })
        .collect();

    format!(
        r#"<table class="data-table">
<thead><tr><th>Title</th><th>Location</th><th>Type</th><th>Price</th><th>Status</th><th>Bookings</th><th></th></tr></thead>
<tbody>{}</tbody>
</table>"#,
        rows
    )
}

/// Booking list. With `actions_base` set, pending bookings get confirm and
/// cancel buttons posting to `{actions_base}/{id}/confirm|cancel`.
pub fn bookings_table(bookings: &[Booking], actions_base: Option<&str>) -> String {
    if bookings.is_empty() {
        return empty_state("No bookings yet.");
    }

    let rows: String = bookings
        .iter()
        .map(|b| {
            let actions = match actions_base {
                Some(base) if b.is_actionable() => format!(
                    r#"<td class="actions">
<form method="post" action="{base}/{id}/confirm"><button type="submit">Confirm</button></form>
<form method="post" action="{base}/{id}/cancel"><button class="danger" type="submit">Cancel</button></form>
</td>"#,
                    base = base,
                    id = escape_html(&b.id)
                ),
                _ => "<td></td>".to_string(),
            };
            format!(
                "<tr><td>{}</td><td>{}<br><small>{} &middot; {}</small></td><td>{} &rarr; {}</td><td>{}</td><td>{}</td>{}</tr>",
                escape_html(&b.property.title),
                escape_html(&b.full_name),
                escape_html(&b.email),
                escape_html(&b.phone_number),
                b.check_in_date.format("%d %b %Y"),
                b.check_out_date.format("%d %b %Y"),
                format_money("NGN", b.total_amount),
                booking_status_badge(b.status),
                actions
            )
        })
        .collect();

    format!(
        r#"<table class="data-table">
<thead><tr><th>Property</th><th>Guest</th><th>Stay</th><th>Amount</th><th>Status</th><th></th></tr></thead>
<tbody>{}</tbody>
</table>"#,
        rows
    )
}

pub fn transactions_table(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return empty_state("No transactions yet.");
    }

    let rows: String = transactions
        .iter()
        .map(|t| {
            let kind = match (t.transaction_type, t.credits_purchased) {
                (TransactionType::Credit, Some(credits)) => format!("{} credit(s)", credits),
                (TransactionType::Credit, None) => "Credits".to_string(),
                (TransactionType::Booking, _) => "Booking".to_string(),
            };
            format!(
                "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&t.reference),
                kind,
                format_money("NGN", t.amount),
                transaction_status_badge(t.status),
                date_label(&t.created_at)
            )
        })
        .collect();

    format!(
        r#"<table class="data-table">
<thead><tr><th>Reference</th><th>Type</th><th>Amount</th><th>Status</th><th>Date</th></tr></thead>
<tbody>{}</tbody>
</table>"#,
        rows
    )
}

/// Outcome screen for `/payments/verify`.
pub fn payment_status(verification: &PaymentVerification) -> String {
    let (class, heading, fallback) = match verification.status {
        TransactionStatus::Success => (
            "payment-success",
            "Payment successful",
            "Your payment has been received.",
        ),
        TransactionStatus::Pending => (
            "payment-pending",
            "Payment pending",
            "We are still waiting for confirmation. This page refreshes automatically.",
        ),
        TransactionStatus::Failed => (
            "payment-failed",
            "Payment failed",
            "Your payment could not be completed.",
        ),
    };
    let amount = verification
        .amount
        .map(|a| format!("<p>Amount: {}</p>", format_money("NGN", a)))
        .unwrap_or_default();

    format!(
        r#"<section class="payment-status {}">
<h1>{}</h1>
<p>{}</p>
{}
<p>Reference: <code>{}</code></p>
<a class="button" href="/dashboard/transactions">View transactions</a> <a href="/">Back to listings</a>
</section>"#,
        class,
        heading,
        escape_html(verification.message.as_deref().unwrap_or(fallback)),
        amount,
        escape_html(&verification.reference)
    )
}
