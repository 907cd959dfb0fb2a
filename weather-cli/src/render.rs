//! Plain-text dashboard layout.

use chrono::{DateTime, Utc};
use std::fmt::Write;
use weather_core::{
    Dashboard, TimeSeriesTable,
    model::Column,
    presenter::{self, DAILY_TEMPERATURE, HOURLY_TREND, LabelledSeries, SOIL_MOISTURE, SOIL_TEMPERATURE},
};

/// Hours covered by the trend section, and the spacing between its rows.
const TREND_HOURS: usize = 24;
const TREND_STEP: usize = 3;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub hours_ahead: usize,
    pub outlook_days: usize,
    pub raw: bool,
}

pub fn dashboard(dash: &Dashboard, now: DateTime<Utc>, options: &RenderOptions) -> anyhow::Result<String> {
    let tz = dash.tz()?;
    let now_local = now.with_timezone(&tz);
    let mut out = String::new();

    let current = presenter::current_conditions(&dash.current, &dash.daily, tz);

    writeln!(out, "Weather for {}", dash.location.display_name)?;
    writeln!(out, "Current Time: {}", current.local_time)?;
    writeln!(out, "{}", presenter::location_caption(&dash.info))?;

    writeln!(out, "\nCurrent Weather")?;
    writeln!(out, "  Status       {} {}", current.weather.description, current.weather.icon)?;
    writeln!(out, "  Temperature  {} °C", num(current.temperature, 1))?;
    writeln!(out, "  Feels Like   {} °C", num(current.feels_like, 1))?;
    writeln!(out, "  Humidity     {} %", num(current.humidity, 0))?;
    writeln!(
        out,
        "  Wind         {} km/h (Gusts {} km/h)",
        num(current.wind_speed, 1),
        num(current.wind_gusts, 1)
    )?;
    let uv = current.uv_index.map_or_else(|| "-".to_string(), |v| num(v, 1));
    writeln!(out, "  UV Index     {uv} (today's max)")?;

    let upcoming = presenter::next_hours(&dash.hourly, now_local, options.hours_ahead);
    writeln!(out, "\nNext {} Hours", options.hours_ahead)?;
    for card in presenter::hour_cards(&upcoming, tz) {
        writeln!(
            out,
            "  {}  {}  {:>4}°  {:>3} km/h  {:>3} %",
            card.label,
            card.weather.icon,
            num(card.temperature, 0),
            num(card.wind_speed, 0),
            num(card.precipitation_probability, 0)
        )?;
    }

    let trend_rows = presenter::next_hours(&dash.hourly, now_local, TREND_HOURS);
    writeln!(out, "\nHourly Forecast Trend (every {TREND_STEP} h)")?;
    write_series(
        &mut out,
        &presenter::labelled_series(&trend_rows, tz, HOURLY_TREND),
        "%a %I %p",
        TREND_STEP,
    )?;

    let this_hour = presenter::next_hours(&dash.hourly, now_local, 1);
    writeln!(out, "\nHourly Soil Data")?;
    write_profile(
        &mut out,
        "Temperature (°C)",
        &presenter::labelled_series(&this_hour, tz, SOIL_TEMPERATURE),
    )?;
    write_profile(
        &mut out,
        "Moisture (m³/m³)",
        &presenter::labelled_series(&this_hour, tz, SOIL_MOISTURE),
    )?;

    writeln!(out, "\nDaily Max/Min Temperature Trend")?;
    write_series(
        &mut out,
        &presenter::labelled_series(&dash.daily, tz, DAILY_TEMPERATURE),
        "%a %b %d",
        1,
    )?;

    writeln!(out, "\n{}-Day Outlook", options.outlook_days)?;
    for day in presenter::outlook(&dash.daily, tz, options.outlook_days) {
        writeln!(
            out,
            "  {:<9} {}  {} {:<26} {:>3}° / {:>3}°  Precip: {:>3}%  Wind: {:>3} km/h",
            day.day_name,
            day.date_str,
            day.weather.icon,
            day.weather.description,
            num(day.temperature_max, 0),
            num(day.temperature_min, 0),
            num(day.precipitation_probability_max, 0),
            num(day.wind_speed_max, 0)
        )?;
    }

    if options.raw {
        writeln!(out, "\nFull Hourly Raw Data")?;
        write_table(&mut out, &dash.hourly)?;
        writeln!(out, "\nFull Daily Raw Data")?;
        write_table(&mut out, &dash.daily)?;
    }

    Ok(out)
}

/// Missing values print as "-".
fn num(value: f32, precision: usize) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{value:.precision$}")
    }
}

fn write_series(out: &mut String, chart: &LabelledSeries, fmt: &str, step: usize) -> std::fmt::Result {
    write!(out, "  {:<12}", "")?;
    for (label, _) in &chart.series {
        write!(out, " {label:>17}")?;
    }
    writeln!(out)?;

    for (i, date) in chart.dates.iter().enumerate().step_by(step.max(1)) {
        write!(out, "  {:<12}", date.format(fmt).to_string())?;
        for (_, values) in &chart.series {
            write!(out, " {:>17}", num(values[i], 1))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_profile(out: &mut String, title: &str, profile: &LabelledSeries) -> std::fmt::Result {
    let cells: Vec<String> = profile
        .series
        .iter()
        .filter_map(|(depth, values)| values.first().map(|v| format!("{depth}: {}", num(*v, 3))))
        .collect();

    if cells.is_empty() {
        writeln!(out, "  {title}: -")
    } else {
        writeln!(out, "  {title}: {}", cells.join(" | "))
    }
}

fn write_table(out: &mut String, table: &TimeSeriesTable) -> std::fmt::Result {
    write!(out, "date")?;
    for (name, _) in &table.columns {
        write!(out, "\t{name}")?;
    }
    writeln!(out)?;

    for (row, date) in table.dates.iter().enumerate() {
        write!(out, "{}", date.to_rfc3339())?;
        for (_, column) in &table.columns {
            match column {
                Column::Float(v) => write!(out, "\t{}", num(v[row], 2))?,
                Column::Instant(v) => match v[row] {
                    Some(at) => write!(out, "\t{}", at.to_rfc3339())?,
                    None => write!(out, "\t-")?,
                },
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
