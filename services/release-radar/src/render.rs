//!
//! src/render.rs
//!
//! Plain html pages for the landing screen and the scan results
//!

use std::fmt::Write;

use html_escape::encode_text;

use crate::scanner::RadarReport;
use crate::types::UserProfile;

pub fn landing_page() -> String {
    let mut html = String::from("<html><body>");
    html.push_str("<h1>Release Radar</h1>");
    html.push_str(
        "<p>Please <a href='/login'>login with Spotify</a> to see what the \
         artists you follow released this week.</p>"
    );
    html.push_str("</body></html>");
    html
}

pub fn results_page(user: &UserProfile, report: &RadarReport, window_days: i64) -> String {
    let mut html = String::from("<html><body>");
    html.push_str("<h1>User Information</h1>");
    let _ = write!(html, "<p>Display Name: {}</p>", encode_text(user.label()));
    if let Some(email) = &user.email {
        let _ = write!(html, "<p>Email: {}</p>", encode_text(email));
    }

    let _ = write!(html, "<h2>Released in the last {window_days} days</h2>");
    let mut any = false;
    html.push_str("<ul>");
    for found in report.with_news() {
        any = true;
        let _ = write!(html, "<li><strong>{}</strong><ul>", encode_text(&found.artist.name));
        for release in &found.releases {
            let _ = write!(
                html,
                "<li>{} ({})</li>",
                encode_text(&release.album_name),
                release.release_date
            );
        }
        if let Some(top) = &found.newest_top_track {
            let _ = write!(
                html,
                "<li>Top track from {} ({})</li>",
                encode_text(&top.album_name),
                top.release_date
            );
        }
        html.push_str("</ul></li>");
    }
    html.push_str("</ul>");
    if !any {
        html.push_str("<p>Nothing new from the artists you follow.</p>");
    }

    if !report.failures.is_empty() {
        let _ = write!(
            html,
            "<p>Could not check {} artist(s) right now.</p>",
            report.failures.len()
        );
    }

    html.push_str("</body></html>");
    html
}
