//! Generated SDK accessors return bare values for required members and `Option`s for
//! optional ones. These traits read either shape into the optional form used by the
//! directory records.

pub(crate) trait FieldText {
    fn text(self) -> Option<String>;
}

impl<T: AsRef<str> + ?Sized> FieldText for &T {
    fn text(self) -> Option<String> {
        Some(self.as_ref().to_string())
    }
}

impl<T: AsRef<str> + ?Sized> FieldText for Option<&T> {
    fn text(self) -> Option<String> {
        self.map(|value| value.as_ref().to_string())
    }
}

pub(crate) trait FieldFlag {
    fn flag(self) -> Option<bool>;
}

impl FieldFlag for bool {
    fn flag(self) -> Option<bool> {
        Some(self)
    }
}

impl FieldFlag for Option<bool> {
    fn flag(self) -> Option<bool> {
        self
    }
}
