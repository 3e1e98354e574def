use crate::chart::{format_value, ticks};
use crate::style;

use data::annotate::CornerMarker;
use data::cursor::Crosshair;
use data::series::Series;
use data::theme;

use iced::advanced::widget::tree::{self, Tree};
use iced::advanced::{self, Clipboard, Layout, Shell, Widget, layout, renderer};
use iced::theme::palette::Extended;
use iced::widget::canvas;
use iced::{Element, Event, Length, Point, Rectangle, Renderer, Size, Theme, Vector, mouse};
use iced_core::renderer::Quad;

use std::marker::PhantomData;

const Y_AXIS_GUTTER: f32 = 66.0; // px
const X_AXIS_HEIGHT: f32 = 40.0;

const MIN_X_TICK_PX: f32 = 80.0;
const TEXT_SIZE: f32 = 12.0;

const READOUT_PADDING: f32 = 6.0;
const READOUT_LINE_H: f32 = TEXT_SIZE + 6.0;

const LEGEND_PADDING: f32 = 4.0;
const LEGEND_LINE_H: f32 = TEXT_SIZE + 6.0;

const CHAR_W: f32 = TEXT_SIZE * 0.64;

/// Speed-over-distance traces for the compared laps, with static corner
/// markers and a pointer-driven crosshair readout.
///
/// The crosshair and readout are only active for exactly two series; any
/// other count renders as a static overlay.
pub struct SpeedTrace<'a, M> {
    series: &'a [Series],
    markers: &'a [CornerMarker],
    track_length: f32,
    stroke_width: f32,
    _message: PhantomData<M>,
}

struct State {
    plot_cache: canvas::Cache,
    y_axis_cache: canvas::Cache,
    x_axis_cache: canvas::Cache,
    overlay_cache: canvas::Cache,
    crosshair: Crosshair,
}

impl State {
    fn new(track_length: f32) -> Self {
        Self {
            plot_cache: canvas::Cache::new(),
            y_axis_cache: canvas::Cache::new(),
            x_axis_cache: canvas::Cache::new(),
            overlay_cache: canvas::Cache::new(),
            crosshair: Crosshair::new(track_length),
        }
    }
}

impl<'a, M> SpeedTrace<'a, M> {
    pub fn new(series: &'a [Series], markers: &'a [CornerMarker], track_length: f32) -> Self {
        Self {
            series,
            markers,
            track_length,
            stroke_width: 2.0,
            _message: PhantomData,
        }
    }

    fn pair(&self) -> Option<(&'a Series, &'a Series)> {
        match self.series {
            [a, b] => Some((a, b)),
            _ => None,
        }
    }

    /// Speed extent extended to fit the corner lines and their labels,
    /// with a small margin.
    fn y_domain(&self) -> (f32, f32) {
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for series in self.series {
            for sample in series.samples() {
                min_y = min_y.min(sample.speed);
                max_y = max_y.max(sample.speed);
            }
        }
        if !min_y.is_finite() || !max_y.is_finite() {
            return (0.0, 1.0);
        }
        for marker in self.markers {
            min_y = min_y.min(marker.label_y);
            max_y = max_y.max(marker.line_max);
        }

        let pad = ((max_y - min_y) * 0.05).max(1.0);
        (min_y - pad, max_y + pad)
    }

    fn compute_scene(&self, layout: Layout<'_>) -> Option<Scene> {
        if self.series.is_empty() || self.track_length <= 0.0 {
            return None;
        }

        let regions = Regions::from_layout(layout);
        let plot = regions.plot;
        if plot.width <= 0.0 || plot.height <= 0.0 {
            return None;
        }

        let (min_y, max_y) = self.y_domain();
        let ctx = PlotContext {
            regions,
            max_x: self.track_length,
            min_y,
            max_y,
            px_per_m: plot.width / self.track_length,
        };

        let total_ticks = (plot.height / TEXT_SIZE / 3.).floor() as usize;
        let (all_ticks, y_step) = ticks(min_y, max_y, total_ticks);
        let y_ticks: Vec<f32> = all_ticks
            .into_iter()
            .filter(|t| (*t >= min_y - f32::EPSILON) && (*t <= max_y + f32::EPSILON))
            .collect();
        let y_labels: Vec<String> = y_ticks.iter().map(|t| format_value(*t, y_step)).collect();

        let x_target = (plot.width / MIN_X_TICK_PX).floor() as usize;
        let (all_ticks, x_step) = ticks(0.0, self.track_length, x_target);
        let x_ticks: Vec<f32> = all_ticks
            .into_iter()
            .filter(|t| *t >= 0.0 && *t <= self.track_length + f32::EPSILON)
            .collect();
        let x_labels: Vec<String> = x_ticks.iter().map(|t| format_value(*t, x_step)).collect();

        Some(Scene {
            ctx,
            y_ticks,
            y_labels,
            x_ticks,
            x_labels,
        })
    }
}

impl<'a, M> Widget<M, Theme, Renderer> for SpeedTrace<'a, M> {
    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<State>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(State::new(self.track_length))
    }

    fn size(&self) -> Size<Length> {
        Size {
            width: Length::Fill,
            height: Length::Fill,
        }
    }

    fn layout(
        &mut self,
        _tree: &mut Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        // Column: [ Row(plot, y_axis) , x_axis ]
        let gutter_w = Y_AXIS_GUTTER;
        let x_axis_h = X_AXIS_HEIGHT;

        let row_node = layout::next_to_each_other(
            &limits.shrink(Size::new(0.0, x_axis_h)),
            0.0,
            |l| {
                layout::atomic(
                    &l.shrink(Size::new(gutter_w, 0.0)),
                    Length::Fill,
                    Length::Fill,
                )
            },
            |l| layout::atomic(l, gutter_w, Length::Fill),
        );

        let x_axis_node = layout::atomic(limits, Length::Fill, x_axis_h);

        let row_node_height = row_node.size().height;
        let total_w = row_node.size().width;
        let total_h = row_node_height + x_axis_h;

        layout::Node::with_children(
            Size::new(total_w, total_h),
            vec![
                row_node.move_to(Point::new(0.0, 0.0)),
                x_axis_node.move_to(Point::new(0.0, row_node_height)),
            ],
        )
    }

    fn update(
        &mut self,
        tree: &mut Tree,
        event: &Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, M>,
        _viewport: &Rectangle,
    ) {
        if shell.is_event_captured() {
            return;
        }

        if let Event::Mouse(mouse::Event::CursorMoved { .. }) = event {
            let Some((a, b)) = self.pair() else {
                return;
            };
            let state = tree.state.downcast_mut::<State>();

            let regions = Regions::from_layout(layout);
            let plot = regions.plot;
            if plot.width <= 0.0 || self.track_length <= 0.0 {
                return;
            }
            let px_per_m = plot.width / self.track_length;

            // `None` outside the plot area; the crosshair ignores it.
            let raw = cursor
                .position_in(layout.bounds())
                .filter(|local| matches!(regions.hit_test(*local), HitZone::Plot))
                .map(|local| (local.x - plot.x) / px_per_m);

            if state.crosshair.on_pointer_move(raw, a, b).is_some() {
                // Clearing an already cleared cache before the next
                // paint is a no-op, so rapid moves coalesce.
                state.overlay_cache.clear();
            }
        }
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        use advanced::Renderer as _;

        let state = tree.state.downcast_ref::<State>();
        let Some(scene) = self.compute_scene(layout) else {
            return;
        };

        let bounds = layout.bounds();
        let palette = theme.extended_palette();

        renderer.with_translation(Vector::new(bounds.x, bounds.y), |r| {
            let plot_rect = scene.ctx.plot_rect();

            let plot_geom = state.plot_cache.draw(r, plot_rect.size(), |frame| {
                self.fill_corner_markers(frame, &scene.ctx, palette);
                self.fill_curves(frame, &scene.ctx);
            });

            let splitter_color = palette.background.strong.color.scale_alpha(0.25);
            r.fill_quad(
                Quad {
                    bounds: Rectangle {
                        x: plot_rect.x,
                        y: plot_rect.y + plot_rect.height,
                        width: plot_rect.width + scene.ctx.regions.y_axis.width,
                        height: 1.0,
                    },
                    snap: true,
                    ..Default::default()
                },
                splitter_color,
            );
            r.fill_quad(
                Quad {
                    bounds: Rectangle {
                        x: plot_rect.x + plot_rect.width,
                        y: plot_rect.y,
                        width: 1.0,
                        height: plot_rect.height,
                    },
                    snap: true,
                    ..Default::default()
                },
                splitter_color,
            );

            let y_rect = scene.ctx.regions.y_axis;
            let y_geom = state.y_axis_cache.draw(r, y_rect.size(), |frame| {
                self.fill_y_axis_labels(frame, &scene, palette);
            });

            let x_rect = scene.ctx.regions.x_axis;
            let x_geom = state.x_axis_cache.draw(r, x_rect.size(), |frame| {
                self.fill_x_axis_labels(frame, &scene, palette);
            });

            let overlay_geom = state.overlay_cache.draw(r, bounds.size(), |frame| {
                self.fill_legend(frame, &scene.ctx, palette);
                if self.pair().is_some() {
                    self.fill_indicator(frame, &scene.ctx, state, palette);
                }
            });

            r.with_translation(Vector::new(plot_rect.x, plot_rect.y), |r| {
                use iced::advanced::graphics::geometry::Renderer as _;
                r.draw_geometry(plot_geom);
            });
            r.with_translation(Vector::new(y_rect.x, y_rect.y), |r| {
                use iced::advanced::graphics::geometry::Renderer as _;
                r.draw_geometry(y_geom);
            });
            r.with_translation(Vector::new(x_rect.x, x_rect.y), |r| {
                use iced::advanced::graphics::geometry::Renderer as _;
                r.draw_geometry(x_geom);
            });

            r.with_layer(
                Rectangle {
                    x: 0.0,
                    y: 0.0,
                    width: bounds.width,
                    height: bounds.height,
                },
                |r| {
                    use iced::advanced::graphics::geometry::Renderer as _;
                    r.draw_geometry(overlay_geom);
                },
            );
        });
    }

    fn mouse_interaction(
        &self,
        _state: &Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &Renderer,
    ) -> mouse::Interaction {
        if let Some(local) = cursor.position_in(layout.bounds()) {
            let regions = Regions::from_layout(layout);
            match regions.hit_test(local) {
                HitZone::Plot => mouse::Interaction::Crosshair,
                _ => mouse::Interaction::default(),
            }
        } else {
            mouse::Interaction::default()
        }
    }
}

impl<'a, M> SpeedTrace<'a, M> {
    fn fill_curves(&self, frame: &mut canvas::Frame, ctx: &PlotContext) {
        for series in self.series {
            let samples = series.samples();
            if samples.is_empty() {
                continue;
            }

            let mut builder = canvas::path::Builder::new();
            let mut started = false;

            for sample in samples {
                if sample.distance > ctx.max_x {
                    break;
                }
                let point = Point::new(ctx.map_x(sample.distance), ctx.map_y(sample.speed));
                if started {
                    builder.line_to(point);
                } else {
                    builder.move_to(point);
                    started = true;
                }
            }

            let path = builder.build();
            frame.stroke(
                &path,
                canvas::Stroke::default()
                    .with_color(series.color())
                    .with_width(self.stroke_width),
            );
        }
    }

    fn fill_corner_markers(
        &self,
        frame: &mut canvas::Frame,
        ctx: &PlotContext,
        palette: &Extended,
    ) {
        let stroke = style::corner_marker_stroke(palette);
        let plot = ctx.plot_rect();

        for marker in self.markers {
            let x = ctx.map_x(marker.distance);
            if x < 0.0 || x > plot.width {
                continue;
            }

            let mut builder = canvas::path::Builder::new();
            builder.move_to(Point::new(x, ctx.map_y(marker.line_min)));
            builder.line_to(Point::new(x, ctx.map_y(marker.line_max)));
            frame.stroke(&builder.build(), stroke.clone());

            frame.fill_text(canvas::Text {
                content: marker.label.clone(),
                position: Point::new(x, ctx.map_y(marker.label_y)),
                color: palette.background.strong.color,
                size: (TEXT_SIZE - 2.0).into(),
                font: style::MONO_FONT,
                align_x: iced::Alignment::Center.into(),
                align_y: iced::Alignment::Center.into(),
                ..Default::default()
            });
        }
    }

    fn fill_y_axis_labels(&self, frame: &mut canvas::Frame, scene: &Scene, palette: &Extended) {
        let ctx = &scene.ctx;
        let plot = ctx.plot_rect();

        for (i, tick) in scene.y_ticks.iter().enumerate() {
            let mut y_local = ctx.map_y(*tick);
            let half_txt = TEXT_SIZE * 0.5;
            y_local = y_local.clamp(half_txt, plot.height - half_txt);

            let right_x = ctx.gutter_width() - 4.0;
            frame.fill_text(canvas::Text {
                content: scene.y_labels[i].clone(),
                position: Point::new(right_x, y_local),
                color: palette.background.base.text,
                size: TEXT_SIZE.into(),
                font: style::MONO_FONT,
                align_x: iced::Alignment::End.into(),
                align_y: iced::Alignment::Center.into(),
                ..Default::default()
            });
        }

        frame.fill_text(canvas::Text {
            content: "km/h".to_string(),
            position: Point::new(ctx.gutter_width() - 4.0, TEXT_SIZE * 0.5 + 2.0),
            color: palette.background.strong.color,
            size: TEXT_SIZE.into(),
            font: style::MONO_FONT,
            align_x: iced::Alignment::End.into(),
            align_y: iced::Alignment::Center.into(),
            ..Default::default()
        });
    }

    fn fill_x_axis_labels(&self, frame: &mut canvas::Frame, scene: &Scene, palette: &Extended) {
        let ctx = &scene.ctx;
        let plot_rect = ctx.plot_rect();

        let baseline_to_text = 4.0;
        let y_center_local = baseline_to_text + TEXT_SIZE * 0.5;

        let mut last_right = f32::NEG_INFINITY;
        for (i, tick) in scene.x_ticks.iter().enumerate() {
            let x_local = ctx.map_x(*tick).clamp(0.0, plot_rect.width);
            let label = &scene.x_labels[i];

            let est_w = (label.len() as f32) * CHAR_W + 8.0;
            let left = x_local - est_w * 0.5;
            let right = x_local + est_w * 0.5;

            if left <= last_right {
                continue;
            }

            frame.fill_text(canvas::Text {
                content: label.clone(),
                position: Point::new(x_local, y_center_local),
                color: palette.background.base.text,
                size: TEXT_SIZE.into(),
                font: style::MONO_FONT,
                align_x: iced::Alignment::Center.into(),
                align_y: iced::Alignment::Center.into(),
                ..Default::default()
            });

            last_right = right;
        }

        frame.fill_text(canvas::Text {
            content: "Distance in m".to_string(),
            position: Point::new(
                plot_rect.width * 0.5,
                y_center_local + TEXT_SIZE + baseline_to_text,
            ),
            color: palette.background.strong.color,
            size: TEXT_SIZE.into(),
            font: style::MONO_FONT,
            align_x: iced::Alignment::Center.into(),
            align_y: iced::Alignment::Center.into(),
            ..Default::default()
        });
    }

    fn fill_legend(&self, frame: &mut canvas::Frame, ctx: &PlotContext, palette: &Extended) {
        if self.series.is_empty() {
            return;
        }
        let plot_rect = ctx.plot_rect();

        let max_chars = self
            .series
            .iter()
            .map(|s| s.driver().len())
            .max()
            .unwrap_or(0);
        let bg_w = (max_chars as f32) * CHAR_W + LEGEND_PADDING * 2.0;
        let bg_h = (self.series.len() as f32) * LEGEND_LINE_H + LEGEND_PADDING * 2.0;

        let bg = Rectangle {
            x: plot_rect.x + plot_rect.width - bg_w - 4.0,
            y: plot_rect.y + 4.0,
            width: bg_w,
            height: bg_h,
        };
        frame.fill_rectangle(
            Point::new(bg.x, bg.y),
            Size::new(bg.width, bg.height),
            palette.background.weakest.color.scale_alpha(0.9),
        );

        let mut y = bg.y + LEGEND_PADDING + LEGEND_LINE_H * 0.5;
        for series in self.series {
            frame.fill_text(canvas::Text {
                content: series.driver().to_string(),
                position: Point::new(bg.x + LEGEND_PADDING, y),
                color: series.color(),
                size: TEXT_SIZE.into(),
                font: style::MONO_FONT,
                align_x: iced::Alignment::Start.into(),
                align_y: iced::Alignment::Center.into(),
                ..Default::default()
            });
            y += LEGEND_LINE_H;
        }
    }

    /// Crosshair line plus the live readout box, drawn only once the
    /// cursor has been inside the plot at least once.
    fn fill_indicator(
        &self,
        frame: &mut canvas::Frame,
        ctx: &PlotContext,
        state: &State,
        palette: &Extended,
    ) {
        let Some((a, b)) = self.pair() else {
            return;
        };
        let Some(distance) = state.crosshair.position() else {
            return;
        };
        let plot_rect = ctx.plot_rect();

        let x = plot_rect.x + ctx.map_x(distance).clamp(0.0, plot_rect.width);
        let mut builder = canvas::path::Builder::new();
        builder.move_to(Point::new(x, plot_rect.y));
        builder.line_to(Point::new(x, plot_rect.y + plot_rect.height));
        frame.stroke(&builder.build(), style::indicator_stroke(palette));

        let Some(readout) = state.crosshair.readout() else {
            return;
        };
        let lines = readout.lines(a.driver(), b.driver());

        let max_chars = lines.iter().map(String::len).max().unwrap_or(0);
        let bg = Rectangle {
            x: plot_rect.x + 4.0,
            y: plot_rect.y + 4.0,
            width: (max_chars as f32) * CHAR_W + READOUT_PADDING * 2.0,
            height: (lines.len() as f32) * READOUT_LINE_H + READOUT_PADDING * 2.0,
        };
        frame.fill_rectangle(
            Point::new(bg.x, bg.y),
            Size::new(bg.width, bg.height),
            palette.background.weakest.color.scale_alpha(0.9),
        );

        let legible = |color: iced::Color| {
            if theme::is_dark(color) {
                theme::lighten(color, 0.25)
            } else {
                color
            }
        };
        let colors = [
            palette.background.base.text,
            legible(a.color()),
            legible(b.color()),
            palette.background.base.text,
        ];

        let mut y = bg.y + READOUT_PADDING + READOUT_LINE_H * 0.5;
        for (line, color) in lines.iter().zip(colors) {
            frame.fill_text(canvas::Text {
                content: line.clone(),
                position: Point::new(bg.x + READOUT_PADDING, y),
                color,
                size: TEXT_SIZE.into(),
                font: style::MONO_FONT,
                align_x: iced::Alignment::Start.into(),
                align_y: iced::Alignment::Center.into(),
                ..Default::default()
            });
            y += READOUT_LINE_H;
        }
    }
}

impl<'a, M> From<SpeedTrace<'a, M>> for Element<'a, M, Theme, Renderer>
where
    M: 'a,
{
    fn from(chart: SpeedTrace<'a, M>) -> Self {
        Element::new(chart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HitZone {
    Plot,
    XAxis,
    YAxis,
    Outside,
}

#[derive(Debug, Clone, Copy)]
struct Regions {
    plot: Rectangle,
    x_axis: Rectangle,
    y_axis: Rectangle,
}

impl Regions {
    fn from_layout(root: Layout<'_>) -> Self {
        let root_bounds = root.bounds();

        // root.children = [ row, x_axis ]
        let row = root.child(0);
        let x_abs = root.child(1).bounds();

        // row.children  = [ plot, y_axis ]
        let plot_abs = row.child(0).bounds();
        let y_abs = row.child(1).bounds();

        let to_local = |r: Rectangle| Rectangle {
            x: r.x - root_bounds.x,
            y: r.y - root_bounds.y,
            width: r.width,
            height: r.height,
        };

        Regions {
            plot: to_local(plot_abs),
            y_axis: to_local(y_abs),
            x_axis: to_local(x_abs),
        }
    }

    fn hit_test(&self, p: Point) -> HitZone {
        let contains = |r: Rectangle| {
            p.x >= r.x && p.x <= r.x + r.width && p.y >= r.y && p.y <= r.y + r.height
        };

        if contains(self.plot) {
            HitZone::Plot
        } else if contains(self.x_axis) {
            HitZone::XAxis
        } else if contains(self.y_axis) {
            HitZone::YAxis
        } else {
            HitZone::Outside
        }
    }
}

struct PlotContext {
    regions: Regions,
    max_x: f32,
    min_y: f32,
    max_y: f32,
    px_per_m: f32,
}

impl PlotContext {
    fn plot_rect(&self) -> Rectangle {
        self.regions.plot
    }

    fn gutter_width(&self) -> f32 {
        self.regions.y_axis.width
    }

    fn map_x(&self, distance: f32) -> f32 {
        distance * self.px_per_m
    }

    fn map_y(&self, value: f32) -> f32 {
        let span = (self.max_y - self.min_y).max(1e-6);
        let t = (value - self.min_y) / span;
        let plot = self.plot_rect();
        plot.height - t.clamp(0.0, 1.0) * plot.height
    }
}

struct Scene {
    ctx: PlotContext,
    y_ticks: Vec<f32>,
    y_labels: Vec<String>,
    x_ticks: Vec<f32>,
    x_labels: Vec<String>,
}
