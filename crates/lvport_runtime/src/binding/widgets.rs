//! Widget classes exposed to scripts
//!
//! Each class gets a namespace of methods taking the object as first
//! argument; constructors live in the `lv` namespace together with
//! `scr_act`. All classes inherit the base `obj` methods.
//!
//! The engine is reached through [`WidgetBackend`]. [`MemoryBackend`]
//! keeps widget state in memory for tests and headless runs.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use lvport_core::{Coord, Result};
use smallvec::SmallVec;

use super::convert::{arg, check_arity};
use super::handle::{HandleArena, NativeId, ObjHandle};
use super::table::BindingTable;
use super::value::ScriptValue;
use crate::error::BindingResult;

/// Widget class of a script-visible object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    /// Base object; also the class of screens
    Obj,
    Label,
    Button,
    Slider,
    Checkbox,
}

impl WidgetClass {
    pub const ALL: [WidgetClass; 5] = [
        WidgetClass::Obj,
        WidgetClass::Label,
        WidgetClass::Button,
        WidgetClass::Slider,
        WidgetClass::Checkbox,
    ];

    /// Script-side class name, also its namespace
    pub fn name(self) -> &'static str {
        match self {
            WidgetClass::Obj => "obj",
            WidgetClass::Label => "label",
            WidgetClass::Button => "btn",
            WidgetClass::Slider => "slider",
            WidgetClass::Checkbox => "checkbox",
        }
    }
}

/// Alignment of an object relative to its parent (or a sibling)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Align {
    #[default]
    Default = 0,
    TopLeft,
    TopMid,
    TopRight,
    BottomLeft,
    BottomMid,
    BottomRight,
    LeftMid,
    RightMid,
    Center,
    OutTopLeft,
    OutTopMid,
    OutTopRight,
    OutBottomLeft,
    OutBottomMid,
    OutBottomRight,
    OutLeftTop,
    OutLeftMid,
    OutLeftBottom,
    OutRightTop,
    OutRightMid,
    OutRightBottom,
}

impl Align {
    pub const ALL: [Align; 22] = [
        Align::Default,
        Align::TopLeft,
        Align::TopMid,
        Align::TopRight,
        Align::BottomLeft,
        Align::BottomMid,
        Align::BottomRight,
        Align::LeftMid,
        Align::RightMid,
        Align::Center,
        Align::OutTopLeft,
        Align::OutTopMid,
        Align::OutTopRight,
        Align::OutBottomLeft,
        Align::OutBottomMid,
        Align::OutBottomRight,
        Align::OutLeftTop,
        Align::OutLeftMid,
        Align::OutLeftBottom,
        Align::OutRightTop,
        Align::OutRightMid,
        Align::OutRightBottom,
    ];

    pub fn from_code(code: u8) -> Option<Align> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Constant name in the `ALIGN` namespace
    pub fn name(self) -> &'static str {
        match self {
            Align::Default => "DEFAULT",
            Align::TopLeft => "TOP_LEFT",
            Align::TopMid => "TOP_MID",
            Align::TopRight => "TOP_RIGHT",
            Align::BottomLeft => "BOTTOM_LEFT",
            Align::BottomMid => "BOTTOM_MID",
            Align::BottomRight => "BOTTOM_RIGHT",
            Align::LeftMid => "LEFT_MID",
            Align::RightMid => "RIGHT_MID",
            Align::Center => "CENTER",
            Align::OutTopLeft => "OUT_TOP_LEFT",
            Align::OutTopMid => "OUT_TOP_MID",
            Align::OutTopRight => "OUT_TOP_RIGHT",
            Align::OutBottomLeft => "OUT_BOTTOM_LEFT",
            Align::OutBottomMid => "OUT_BOTTOM_MID",
            Align::OutBottomRight => "OUT_BOTTOM_RIGHT",
            Align::OutLeftTop => "OUT_LEFT_TOP",
            Align::OutLeftMid => "OUT_LEFT_MID",
            Align::OutLeftBottom => "OUT_LEFT_BOTTOM",
            Align::OutRightTop => "OUT_RIGHT_TOP",
            Align::OutRightMid => "OUT_RIGHT_MID",
            Align::OutRightBottom => "OUT_RIGHT_BOTTOM",
        }
    }
}

/// Engine widget operations the bindings call into
pub trait WidgetBackend {
    /// Create an object; `None` parent means the active screen
    fn create(&mut self, class: WidgetClass, parent: Option<NativeId>) -> Result<NativeId>;
    /// Delete an object and its children
    fn delete(&mut self, id: NativeId);
    /// Delete the children of an object
    fn clean(&mut self, id: NativeId);
    fn exists(&self, id: NativeId) -> bool;
    /// The active screen
    fn screen(&self) -> NativeId;

    fn set_pos(&mut self, id: NativeId, x: Coord, y: Coord);
    fn pos(&self, id: NativeId) -> (Coord, Coord);
    fn set_size(&mut self, id: NativeId, width: Coord, height: Coord);
    fn size(&self, id: NativeId) -> (Coord, Coord);
    fn align(&mut self, id: NativeId, align: Align, x_ofs: Coord, y_ofs: Coord);

    fn set_text(&mut self, id: NativeId, text: &str);
    fn text(&self, id: NativeId) -> String;

    fn set_value(&mut self, id: NativeId, value: i32, animate: bool);
    fn value(&self, id: NativeId) -> i32;
    fn set_range(&mut self, id: NativeId, min: i32, max: i32);
    fn range(&self, id: NativeId) -> (i32, i32);

    fn set_checked(&mut self, id: NativeId, checked: bool);
    fn is_checked(&self, id: NativeId) -> bool;
}

/// Binding context giving access to the handle arena and the engine
pub trait WidgetContext {
    fn widgets(&mut self) -> (&mut HandleArena, &mut dyn WidgetBackend);
}

// ============================================================================
// Registration
// ============================================================================

/// Register a method of `class` whose first argument is the object itself
fn method<C, F>(
    table: &mut BindingTable<C>,
    class: WidgetClass,
    name: &'static str,
    arity: RangeInclusive<usize>,
    f: F,
) where
    C: WidgetContext + 'static,
    F: Fn(&mut dyn WidgetBackend, NativeId, &[ScriptValue]) -> BindingResult<ScriptValue>
        + Send
        + Sync
        + 'static,
{
    table.register(class.name(), name, move |ctx: &mut C, args: &[ScriptValue]| {
        check_arity(name, args, arity.clone())?;
        let handle: ObjHandle = arg(args, 0)?;
        let (arena, backend) = ctx.widgets();
        let id = arena.resolve(handle, class)?;
        f(backend, id, &args[1..])
    });
}

fn register_constructors<C: WidgetContext + 'static>(table: &mut BindingTable<C>) {
    for class in WidgetClass::ALL {
        table.register("lv", class.name(), move |ctx: &mut C, args: &[ScriptValue]| {
            check_arity(class.name(), args, 0..=1)?;
            let parent: Option<ObjHandle> = arg(args, 0)?;
            let (arena, backend) = ctx.widgets();
            let parent = parent
                .map(|h| arena.resolve(h, WidgetClass::Obj))
                .transpose()?;
            let id = backend.create(class, parent)?;
            tracing::trace!(class = class.name(), id = id.0, "Created object");
            Ok(ScriptValue::Handle(arena.insert(id, class)))
        });
    }

    table.register("lv", "scr_act", |ctx: &mut C, args: &[ScriptValue]| {
        check_arity("scr_act", args, 0..=0)?;
        let (arena, backend) = ctx.widgets();
        let screen = backend.screen();
        Ok(ScriptValue::Handle(arena.handle_for(screen, WidgetClass::Obj)))
    });

    for align in Align::ALL {
        table.register_value("ALIGN", align.name(), ScriptValue::Int(align.code() as i64));
    }
}

fn register_obj<C: WidgetContext + 'static>(table: &mut BindingTable<C>) {
    let obj = WidgetClass::Obj;

    method(table, obj, "set_pos", 3..=3, |b, id, args| {
        b.set_pos(id, arg(args, 0)?, arg(args, 1)?);
        Ok(ScriptValue::None)
    });
    method(table, obj, "set_size", 3..=3, |b, id, args| {
        b.set_size(id, arg(args, 0)?, arg(args, 1)?);
        Ok(ScriptValue::None)
    });
    method(table, obj, "set_width", 2..=2, |b, id, args| {
        let (_, h) = b.size(id);
        b.set_size(id, arg(args, 0)?, h);
        Ok(ScriptValue::None)
    });
    method(table, obj, "set_height", 2..=2, |b, id, args| {
        let (w, _) = b.size(id);
        b.set_size(id, w, arg(args, 0)?);
        Ok(ScriptValue::None)
    });
    method(table, obj, "get_x", 1..=1, |b, id, _| Ok(ScriptValue::Int(b.pos(id).0 as i64)));
    method(table, obj, "get_y", 1..=1, |b, id, _| Ok(ScriptValue::Int(b.pos(id).1 as i64)));
    method(table, obj, "get_width", 1..=1, |b, id, _| {
        Ok(ScriptValue::Int(b.size(id).0 as i64))
    });
    method(table, obj, "get_height", 1..=1, |b, id, _| {
        Ok(ScriptValue::Int(b.size(id).1 as i64))
    });
    method(table, obj, "align", 2..=4, |b, id, args| {
        let code: u8 = arg(args, 0)?;
        let align = Align::from_code(code).ok_or(crate::error::BindingError::OutOfRange {
            value: code as i64,
            target: "lv.ALIGN",
        })?;
        let x_ofs: Option<Coord> = arg(args, 1)?;
        let y_ofs: Option<Coord> = arg(args, 2)?;
        b.align(id, align, x_ofs.unwrap_or(0), y_ofs.unwrap_or(0));
        Ok(ScriptValue::None)
    });
    method(table, obj, "center", 1..=1, |b, id, _| {
        b.align(id, Align::Center, 0, 0);
        Ok(ScriptValue::None)
    });

    // clean and delete need the arena as well as the backend
    table.register(obj.name(), "clean", |ctx: &mut C, args: &[ScriptValue]| {
        check_arity("clean", args, 1..=1)?;
        let handle: ObjHandle = arg(args, 0)?;
        let (arena, backend) = ctx.widgets();
        let id = arena.resolve(handle, WidgetClass::Obj)?;
        backend.clean(id);
        let backend = &*backend;
        let invalidated = arena.retain_live(|id| backend.exists(id));
        tracing::trace!(id = id.0, invalidated, "Cleaned object");
        Ok(ScriptValue::None)
    });
    table.register(obj.name(), "delete", |ctx: &mut C, args: &[ScriptValue]| {
        check_arity("delete", args, 1..=1)?;
        let handle: ObjHandle = arg(args, 0)?;
        let (arena, backend) = ctx.widgets();
        let id = arena.resolve(handle, WidgetClass::Obj)?;
        backend.delete(id);
        let backend = &*backend;
        let invalidated = arena.retain_live(|id| backend.exists(id));
        tracing::trace!(id = id.0, invalidated, "Deleted object");
        Ok(ScriptValue::None)
    });
    table.register(obj.name(), "is_valid", |ctx: &mut C, args: &[ScriptValue]| {
        check_arity("is_valid", args, 1..=1)?;
        let handle: ObjHandle = arg(args, 0)?;
        let (arena, backend) = ctx.widgets();
        let valid = arena
            .resolve(handle, WidgetClass::Obj)
            .is_ok_and(|id| backend.exists(id));
        Ok(ScriptValue::Bool(valid))
    });

    table.register_unsupported(obj.name(), "add_event_cb", "takes a native callback");
    table.register_unsupported(obj.name(), "set_style", "takes a style struct by pointer");
    table.register_unsupported(obj.name(), "add_style", "takes a style struct by pointer");
}

fn register_text<C: WidgetContext + 'static>(table: &mut BindingTable<C>, class: WidgetClass) {
    method(table, class, "set_text", 2..=2, |b, id, args| {
        let text: String = arg(args, 0)?;
        b.set_text(id, &text);
        Ok(ScriptValue::None)
    });
    method(table, class, "get_text", 1..=1, |b, id, _| Ok(ScriptValue::Str(b.text(id))));
}

fn register_slider<C: WidgetContext + 'static>(table: &mut BindingTable<C>) {
    let slider = WidgetClass::Slider;

    method(table, slider, "set_value", 2..=3, |b, id, args| {
        let value: i32 = arg(args, 0)?;
        let animate: Option<bool> = arg(args, 1)?;
        b.set_value(id, value, animate.unwrap_or(false));
        Ok(ScriptValue::None)
    });
    method(table, slider, "get_value", 1..=1, |b, id, _| {
        Ok(ScriptValue::Int(b.value(id) as i64))
    });
    method(table, slider, "set_range", 3..=3, |b, id, args| {
        b.set_range(id, arg(args, 0)?, arg(args, 1)?);
        Ok(ScriptValue::None)
    });
    method(table, slider, "get_min_value", 1..=1, |b, id, _| {
        Ok(ScriptValue::Int(b.range(id).0 as i64))
    });
    method(table, slider, "get_max_value", 1..=1, |b, id, _| {
        Ok(ScriptValue::Int(b.range(id).1 as i64))
    });
}

fn register_checkbox<C: WidgetContext + 'static>(table: &mut BindingTable<C>) {
    let checkbox = WidgetClass::Checkbox;
    register_text(table, checkbox);

    method(table, checkbox, "set_checked", 2..=2, |b, id, args| {
        b.set_checked(id, arg(args, 0)?);
        Ok(ScriptValue::None)
    });
    method(table, checkbox, "is_checked", 1..=1, |b, id, _| {
        Ok(ScriptValue::Bool(b.is_checked(id)))
    });
}

/// Register constructors, constants and every widget class
pub fn register_widgets<C: WidgetContext + 'static>(table: &mut BindingTable<C>) {
    register_constructors(table);
    register_obj(table);
    register_text(table, WidgetClass::Label);
    register_slider(table);
    register_checkbox(table);

    for class in WidgetClass::ALL {
        if class != WidgetClass::Obj {
            table.inherit(class.name(), WidgetClass::Obj.name());
        }
    }

    // Line objects are not exposed; their one interesting setter takes an array
    table.register_unsupported("line", "set_points", "takes a native point array");
    table.inherit("line", WidgetClass::Obj.name());
}

// ============================================================================
// In-memory backend
// ============================================================================

/// State of one object in [`MemoryBackend`]
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryWidget {
    pub class: WidgetClass,
    pub parent: Option<NativeId>,
    pub x: Coord,
    pub y: Coord,
    pub width: Coord,
    pub height: Coord,
    pub align: Option<(Align, Coord, Coord)>,
    pub text: String,
    pub value: i32,
    pub min: i32,
    pub max: i32,
    pub checked: bool,
}

impl MemoryWidget {
    fn new(class: WidgetClass, parent: Option<NativeId>) -> Self {
        let text = match class {
            WidgetClass::Label => "Text",
            WidgetClass::Checkbox => "Check box",
            _ => "",
        };
        Self {
            class,
            parent,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            align: None,
            text: text.to_string(),
            value: 0,
            min: 0,
            max: 100,
            checked: false,
        }
    }
}

/// Widget backend keeping object state in memory
#[derive(Debug)]
pub struct MemoryBackend {
    widgets: BTreeMap<NativeId, MemoryWidget>,
    next_id: u64,
    screen: NativeId,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Backend with one empty screen
    pub fn new() -> Self {
        let screen = NativeId(1);
        let mut widgets = BTreeMap::new();
        widgets.insert(screen, MemoryWidget::new(WidgetClass::Obj, None));
        Self {
            widgets,
            next_id: 2,
            screen,
        }
    }

    pub fn widget(&self, id: NativeId) -> Option<&MemoryWidget> {
        self.widgets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn children(&self, id: NativeId) -> SmallVec<[NativeId; 8]> {
        self.widgets
            .iter()
            .filter(|(_, w)| w.parent == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    fn remove_tree(&mut self, id: NativeId) {
        let mut pending: SmallVec<[NativeId; 8]> = SmallVec::new();
        pending.push(id);
        while let Some(next) = pending.pop() {
            pending.extend(self.children(next));
            self.widgets.remove(&next);
        }
    }

    fn with<F: FnOnce(&mut MemoryWidget)>(&mut self, id: NativeId, f: F) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            f(widget);
        }
    }
}

impl WidgetBackend for MemoryBackend {
    fn create(&mut self, class: WidgetClass, parent: Option<NativeId>) -> Result<NativeId> {
        let parent = parent.unwrap_or(self.screen);
        if !self.widgets.contains_key(&parent) {
            return Err(lvport_core::PortError::Platform(format!(
                "parent object {} does not exist",
                parent.0
            )));
        }
        let id = NativeId(self.next_id);
        self.next_id += 1;
        self.widgets.insert(id, MemoryWidget::new(class, Some(parent)));
        Ok(id)
    }

    fn delete(&mut self, id: NativeId) {
        if id == self.screen {
            tracing::warn!("Refusing to delete the active screen");
            return;
        }
        self.remove_tree(id);
    }

    fn clean(&mut self, id: NativeId) {
        for child in self.children(id) {
            self.remove_tree(child);
        }
    }

    fn exists(&self, id: NativeId) -> bool {
        self.widgets.contains_key(&id)
    }

    fn screen(&self) -> NativeId {
        self.screen
    }

    fn set_pos(&mut self, id: NativeId, x: Coord, y: Coord) {
        self.with(id, |w| {
            w.x = x;
            w.y = y;
            w.align = None;
        });
    }

    fn pos(&self, id: NativeId) -> (Coord, Coord) {
        self.widgets.get(&id).map_or((0, 0), |w| (w.x, w.y))
    }

    fn set_size(&mut self, id: NativeId, width: Coord, height: Coord) {
        self.with(id, |w| {
            w.width = width;
            w.height = height;
        });
    }

    fn size(&self, id: NativeId) -> (Coord, Coord) {
        self.widgets.get(&id).map_or((0, 0), |w| (w.width, w.height))
    }

    fn align(&mut self, id: NativeId, align: Align, x_ofs: Coord, y_ofs: Coord) {
        self.with(id, |w| w.align = Some((align, x_ofs, y_ofs)));
    }

    fn set_text(&mut self, id: NativeId, text: &str) {
        self.with(id, |w| w.text = text.to_string());
    }

    fn text(&self, id: NativeId) -> String {
        self.widgets
            .get(&id)
            .map(|w| w.text.clone())
            .unwrap_or_default()
    }

    fn set_value(&mut self, id: NativeId, value: i32, _animate: bool) {
        self.with(id, |w| w.value = value.clamp(w.min, w.max));
    }

    fn value(&self, id: NativeId) -> i32 {
        self.widgets.get(&id).map_or(0, |w| w.value)
    }

    fn set_range(&mut self, id: NativeId, min: i32, max: i32) {
        self.with(id, |w| {
            let (min, max) = if min <= max { (min, max) } else { (max, min) };
            w.min = min;
            w.max = max;
            w.value = w.value.clamp(min, max);
        });
    }

    fn range(&self, id: NativeId) -> (i32, i32) {
        self.widgets.get(&id).map_or((0, 0), |w| (w.min, w.max))
    }

    fn set_checked(&mut self, id: NativeId, checked: bool) {
        self.with(id, |w| w.checked = checked);
    }

    fn is_checked(&self, id: NativeId) -> bool {
        self.widgets.get(&id).is_some_and(|w| w.checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;

    #[derive(Default)]
    struct Ctx {
        arena: HandleArena,
        backend: MemoryBackend,
    }

    impl WidgetContext for Ctx {
        fn widgets(&mut self) -> (&mut HandleArena, &mut dyn WidgetBackend) {
            (&mut self.arena, &mut self.backend)
        }
    }

    fn setup() -> (BindingTable<Ctx>, Ctx) {
        let mut table = BindingTable::new();
        register_widgets(&mut table);
        (table, Ctx::default())
    }

    fn handle(v: ScriptValue) -> ObjHandle {
        v.as_handle().unwrap()
    }

    #[test]
    fn test_align_codes() {
        assert_eq!(Align::from_code(9), Some(Align::Center));
        assert_eq!(Align::from_code(21), Some(Align::OutRightBottom));
        assert_eq!(Align::from_code(22), None);
        for align in Align::ALL {
            assert_eq!(Align::from_code(align.code()), Some(align));
        }
    }

    #[test]
    fn test_label_text_round_trip() {
        let (table, mut ctx) = setup();
        let label = table.call(&mut ctx, "lv", "label", &[]).unwrap();
        assert_eq!(
            table.call(&mut ctx, "label", "get_text", &[label.clone()]),
            Ok(ScriptValue::Str("Text".into()))
        );
        table
            .call(&mut ctx, "label", "set_text", &[label.clone(), ScriptValue::Str("Hi".into())])
            .unwrap();
        assert_eq!(
            table.call(&mut ctx, "label", "get_text", &[label]),
            Ok(ScriptValue::Str("Hi".into()))
        );
    }

    #[test]
    fn test_base_methods_accept_any_widget() {
        let (table, mut ctx) = setup();
        let btn = table.call(&mut ctx, "lv", "btn", &[]).unwrap();
        table
            .call(
                &mut ctx,
                "btn",
                "set_pos",
                &[btn.clone(), ScriptValue::Int(10), ScriptValue::Int(20)],
            )
            .unwrap();
        table
            .call(&mut ctx, "obj", "align", &[btn.clone(), ScriptValue::Int(9)])
            .unwrap();
        let id = ctx.arena.resolve(handle(btn), WidgetClass::Button).unwrap();
        let widget = ctx.backend.widget(id).unwrap();
        assert_eq!((widget.x, widget.y), (10, 20));
        assert_eq!(widget.align, Some((Align::Center, 0, 0)));
    }

    #[test]
    fn test_rejects_wrong_class_and_range() {
        let (table, mut ctx) = setup();
        let btn = table.call(&mut ctx, "lv", "btn", &[]).unwrap();
        assert_eq!(
            table.call(&mut ctx, "label", "set_text", &[btn.clone(), ScriptValue::Str("x".into())]),
            Err(BindingError::WrongClass {
                expected: "label",
                actual: "btn"
            })
        );
        assert_eq!(
            table.call(
                &mut ctx,
                "obj",
                "set_pos",
                &[btn.clone(), ScriptValue::Int(70000), ScriptValue::Int(0)]
            ),
            Err(BindingError::OutOfRange {
                value: 70000,
                target: "i16"
            })
        );
        assert!(matches!(
            table.call(&mut ctx, "obj", "align", &[btn, ScriptValue::Int(40)]),
            Err(BindingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_delete_invalidates_children() {
        let (table, mut ctx) = setup();
        let parent = table.call(&mut ctx, "lv", "obj", &[]).unwrap();
        let child = table.call(&mut ctx, "lv", "label", &[parent.clone()]).unwrap();

        table.call(&mut ctx, "obj", "delete", &[parent.clone()]).unwrap();
        assert_eq!(
            table.call(&mut ctx, "label", "get_text", &[child.clone()]),
            Err(BindingError::StaleHandle { class: "label" })
        );
        assert_eq!(
            table.call(&mut ctx, "obj", "is_valid", &[child]),
            Ok(ScriptValue::Bool(false))
        );
        assert!(table.call(&mut ctx, "obj", "delete", &[parent]).is_err());
        assert_eq!(ctx.backend.len(), 1);
    }

    #[test]
    fn test_clean_invalidates_children() {
        let (table, mut ctx) = setup();
        let parent = table.call(&mut ctx, "lv", "obj", &[]).unwrap();
        let child = table.call(&mut ctx, "lv", "label", &[parent.clone()]).unwrap();
        assert_eq!(ctx.arena.len(), 2);

        table.call(&mut ctx, "obj", "clean", &[parent.clone()]).unwrap();
        assert_eq!(
            table.call(&mut ctx, "label", "set_text", &[child.clone(), ScriptValue::Str("x".into())]),
            Err(BindingError::StaleHandle { class: "label" })
        );
        assert_eq!(
            table.call(&mut ctx, "label", "get_text", &[child]),
            Err(BindingError::StaleHandle { class: "label" })
        );
        assert_eq!(ctx.arena.len(), 1);
        assert_eq!(
            table.call(&mut ctx, "obj", "is_valid", &[parent]),
            Ok(ScriptValue::Bool(true))
        );
    }

    #[test]
    fn test_slider_value_clamped_to_range() {
        let (table, mut ctx) = setup();
        let slider = table.call(&mut ctx, "lv", "slider", &[]).unwrap();
        table
            .call(
                &mut ctx,
                "slider",
                "set_range",
                &[slider.clone(), ScriptValue::Int(10), ScriptValue::Int(50)],
            )
            .unwrap();
        table
            .call(
                &mut ctx,
                "slider",
                "set_value",
                &[slider.clone(), ScriptValue::Int(80), ScriptValue::Bool(true)],
            )
            .unwrap();
        assert_eq!(
            table.call(&mut ctx, "slider", "get_value", &[slider]),
            Ok(ScriptValue::Int(50))
        );
    }

    #[test]
    fn test_checkbox_and_screen() {
        let (table, mut ctx) = setup();
        let scr = table.call(&mut ctx, "lv", "scr_act", &[]).unwrap();
        assert_eq!(table.call(&mut ctx, "lv", "scr_act", &[]).unwrap(), scr);

        let cb = table.call(&mut ctx, "lv", "checkbox", &[scr]).unwrap();
        table
            .call(&mut ctx, "checkbox", "set_checked", &[cb.clone(), ScriptValue::Bool(true)])
            .unwrap();
        assert_eq!(
            table.call(&mut ctx, "checkbox", "is_checked", &[cb]),
            Ok(ScriptValue::Bool(true))
        );
    }

    #[test]
    fn test_unsupported_surface() {
        let (table, mut ctx) = setup();
        let label = table.call(&mut ctx, "lv", "label", &[]).unwrap();
        assert!(matches!(
            table.call(&mut ctx, "label", "add_event_cb", &[label]),
            Err(BindingError::Unsupported { .. })
        ));
        assert!(table
            .unsupported("line")
            .contains(&("set_points", "takes a native point array")));
        assert!(table.functions("label").contains(&"set_pos"));
        assert_eq!(table.attr("ALIGN", "CENTER"), Ok(ScriptValue::Int(9)));
    }
}
