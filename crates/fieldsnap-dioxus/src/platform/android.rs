//! Android-specific platform functionality
//!
//! Runtime permissions, camera capture, library picks, content provider
//! reads, public storage folders and one-shot location fixes, all through
//! JNI. Helper threads cannot find app classes by name, so the one AndroidX
//! class needed is loaded through the activity's class loader. Anything that
//! waits on the user or on a provider runs on a helper thread and reports
//! back through a oneshot channel.

use super::activity_result::{capture_response, pick_response};
use fieldsnap_engine::host::{SystemClock, camera_unavailable};
use fieldsnap_engine::{
    Clock, ContentReader, Coordinates, Geolocation, ImagePicker, ImageSource, LocationError,
    LocationErrorCode, LocationOptions, Permission, PermissionService, PermissionStatus,
    PickerErrorCode, PickerOptions, PickerResponse, PlatformError, Position, Rationale,
    StorageError,
};
use futures::channel::oneshot;
use jni::JNIEnv;
use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString, JValue};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

const PERMISSION_GRANTED: i32 = 0; // PackageManager.PERMISSION_GRANTED
const PERMISSION_REQUEST_CODE: i32 = 0x5a;
const FLAG_ACTIVITY_NEW_TASK: i32 = 0x10000000; // Intent.FLAG_ACTIVITY_NEW_TASK
const FLAG_UPDATE_CURRENT: i32 = 0x08000000; // PendingIntent.FLAG_UPDATE_CURRENT
const FLAG_IMMUTABLE: i32 = 0x04000000; // PendingIntent.FLAG_IMMUTABLE
const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x00000001; // Intent.FLAG_GRANT_READ_URI_PERMISSION
const FLAG_GRANT_WRITE_URI_PERMISSION: i32 = 0x00000002; // Intent.FLAG_GRANT_WRITE_URI_PERMISSION
const FIX_ACTION: &str = "fieldsnap.intent.action.LOCATION_FIX";
const START_FOR_RESULT_CONTRACT: &str =
    "androidx.activity.result.contract.ActivityResultContracts$StartActivityForResult";
const READ_CHUNK: i32 = 64 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long the system permission dialog gets to take window focus
const DIALOG_APPEAR_WAIT: Duration = Duration::from_secs(2);
/// How long the user gets to answer it
const DIALOG_ANSWER_WAIT: Duration = Duration::from_secs(120);
/// How long a started camera or picker activity gets to take window focus
const ACTIVITY_APPEAR_WAIT: Duration = Duration::from_secs(5);
/// How long the user gets to take or choose a photo
const ACTIVITY_RETURN_WAIT: Duration = Duration::from_secs(600);
/// How long after focus returns the activity result may still be in flight
const RESULT_WAIT: Duration = Duration::from_secs(1);

/// Helper to run JNI operations with proper error handling
fn with_jni<F, T>(f: F) -> Result<T, jni::errors::Error>
where
    F: FnOnce(&mut JNIEnv, &JObject) -> Result<T, jni::errors::Error>,
{
    let ctx = ndk_context::android_context();
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }?;
    let mut env = vm.attach_current_thread()?;
    let context = unsafe { JObject::from_raw(ctx.context().cast()) };

    let result = f(&mut env, &context);
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    result
}

/// Run blocking work off the UI thread and await its single result
async fn on_helper_thread<F, T>(f: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    thread::spawn(move || {
        let _ = sender.send(f());
    });
    receiver.await.ok()
}

fn platform_error(e: jni::errors::Error) -> PlatformError {
    PlatformError::Call(format!("JNI error: {e}"))
}

fn location_error(e: jni::errors::Error) -> LocationError {
    LocationError::new(LocationErrorCode::InternalError, format!("JNI error: {e}"))
}

/// Get the Android SDK version (Build.VERSION.SDK_INT)
fn get_sdk_version(env: &mut JNIEnv) -> Result<i32, jni::errors::Error> {
    let build_version = env.find_class("android/os/Build$VERSION")?;
    let sdk_int = env.get_static_field(build_version, "SDK_INT", "I")?;
    sdk_int.i()
}

/// Context.checkPermission for our own pid/uid
fn check_permission(
    env: &mut JNIEnv,
    context: &JObject,
    permission: &str,
) -> Result<bool, jni::errors::Error> {
    let process = env.find_class("android/os/Process")?;
    let pid = env.call_static_method(&process, "myPid", "()I", &[])?.i()?;
    let uid = env.call_static_method(&process, "myUid", "()I", &[])?.i()?;
    let permission = env.new_string(permission)?;

    let result = env.call_method(
        context,
        "checkPermission",
        "(Ljava/lang/String;II)I",
        &[JValue::Object(&permission), JValue::Int(pid), JValue::Int(uid)],
    )?;

    Ok(result.i()? == PERMISSION_GRANTED)
}

/// Activity.requestPermissions(new String[] { permission }, code)
fn request_permission(
    env: &mut JNIEnv,
    activity: &JObject,
    permission: &str,
) -> Result<(), jni::errors::Error> {
    let permission = env.new_string(permission)?;
    let permissions = env.new_object_array(1, "java/lang/String", JObject::null())?;
    env.set_object_array_element(&permissions, 0, &permission)?;

    env.call_method(
        activity,
        "requestPermissions",
        "([Ljava/lang/String;I)V",
        &[
            JValue::Object(&permissions),
            JValue::Int(PERMISSION_REQUEST_CODE),
        ],
    )?;

    Ok(())
}

fn should_show_rationale(
    env: &mut JNIEnv,
    activity: &JObject,
    permission: &str,
) -> Result<bool, jni::errors::Error> {
    let permission = env.new_string(permission)?;
    env.call_method(
        activity,
        "shouldShowRequestPermissionRationale",
        "(Ljava/lang/String;)Z",
        &[JValue::Object(&permission)],
    )?
    .z()
}

fn has_window_focus(env: &mut JNIEnv, activity: &JObject) -> Result<bool, jni::errors::Error> {
    env.call_method(activity, "hasWindowFocus", "()Z", &[])?.z()
}

/// Poll until the activity's window focus equals `focused`. Returns whether it did.
fn wait_for_focus(focused: bool, limit: Duration) -> Result<bool, jni::errors::Error> {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if with_jni(|env, activity| has_window_focus(env, activity))? == focused {
            return Ok(true);
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(false)
}

/// Show the system dialog and wait for the answer.
///
/// The activity loses window focus while the dialog is up; once it comes
/// back the permission is re-checked. A denied permission whose rationale
/// flag is false was denied permanently.
fn request_blocking(permission: &'static str) -> Result<PermissionStatus, jni::errors::Error> {
    with_jni(|env, activity| request_permission(env, activity, permission))?;

    if wait_for_focus(false, DIALOG_APPEAR_WAIT)? {
        wait_for_focus(true, DIALOG_ANSWER_WAIT)?;
    }

    with_jni(|env, activity| {
        if check_permission(env, activity, permission)? {
            Ok(PermissionStatus::Granted)
        } else if should_show_rationale(env, activity, permission)? {
            Ok(PermissionStatus::Denied)
        } else {
            Ok(PermissionStatus::NeverAskAgain)
        }
    })
}

/// Runtime permissions through the hosting activity
#[derive(Debug, Clone, Copy)]
pub struct AndroidPermissions {
    api_level: Option<u32>,
}

impl AndroidPermissions {
    pub fn new() -> Self {
        let api_level = match with_jni(|env, _| get_sdk_version(env)) {
            Ok(sdk_version) => {
                log::info!("Android SDK version: {sdk_version}");
                u32::try_from(sdk_version).ok()
            }
            Err(e) => {
                log::error!("JNI error: {e}");
                None
            }
        };
        Self { api_level }
    }
}

impl Default for AndroidPermissions {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionService for AndroidPermissions {
    async fn check(&self, permission: Permission) -> Result<bool, PlatformError> {
        let name = permission.android_name();
        with_jni(|env, context| check_permission(env, context, name)).map_err(platform_error)
    }

    async fn request(
        &self,
        permission: Permission,
        rationale: Option<&Rationale>,
    ) -> Result<PermissionStatus, PlatformError> {
        if let Some(rationale) = rationale {
            log::debug!("{}: {}", rationale.title, rationale.message);
        }
        let name = permission.android_name();
        on_helper_thread(move || request_blocking(name))
            .await
            .ok_or_else(|| PlatformError::Unavailable("permission helper exited".to_string()))?
            .map_err(platform_error)
    }

    fn api_level(&self) -> Option<u32> {
        self.api_level
    }
}

/// Environment.getExternalStoragePublicDirectory(Environment.<field>)
pub fn public_directory(field: &str) -> Option<PathBuf> {
    let result = with_jni(|env, _| {
        let environment = env.find_class("android/os/Environment")?;
        let kind = env
            .get_static_field(&environment, field, "Ljava/lang/String;")?
            .l()?;
        let directory = env
            .call_static_method(
                &environment,
                "getExternalStoragePublicDirectory",
                "(Ljava/lang/String;)Ljava/io/File;",
                &[JValue::Object(&kind)],
            )?
            .l()?;
        let path: JString = env
            .call_method(&directory, "getAbsolutePath", "()Ljava/lang/String;", &[])?
            .l()?
            .into();
        let path: String = env.get_string(&path)?.into();
        Ok(PathBuf::from(path))
    });

    match result {
        Ok(path) => Some(path),
        Err(e) => {
            log::error!("JNI error resolving {field}: {e}");
            None
        }
    }
}

fn content_resolver<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
) -> Result<JObject<'local>, jni::errors::Error> {
    env.call_method(
        context,
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )?
    .l()
}

fn parse_uri<'local>(
    env: &mut JNIEnv<'local>,
    uri: &str,
) -> Result<JObject<'local>, jni::errors::Error> {
    let uri = env.new_string(uri)?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&uri)],
    )?
    .l()
}

fn to_rust_string(env: &mut JNIEnv, object: &JObject) -> Result<String, jni::errors::Error> {
    let text: JString = env
        .call_method(object, "toString", "()Ljava/lang/String;", &[])?
        .l()?
        .into();
    Ok(env.get_string(&text)?.into())
}

/// ContentResolver.getType, `None` when the provider does not say
fn content_type(
    env: &mut JNIEnv,
    context: &JObject,
    uri: &str,
) -> Result<Option<String>, jni::errors::Error> {
    let resolver = content_resolver(env, context)?;
    let uri = parse_uri(env, uri)?;
    let mime_type = env
        .call_method(
            &resolver,
            "getType",
            "(Landroid/net/Uri;)Ljava/lang/String;",
            &[JValue::Object(&uri)],
        )?
        .l()?;
    if mime_type.is_null() {
        return Ok(None);
    }
    Ok(Some(to_rust_string(env, &mime_type)?))
}

fn open_input_stream<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
    uri: &str,
) -> Result<JObject<'local>, jni::errors::Error> {
    let resolver = content_resolver(env, context)?;
    let uri = parse_uri(env, uri)?;
    let stream = env
        .call_method(
            &resolver,
            "openInputStream",
            "(Landroid/net/Uri;)Ljava/io/InputStream;",
            &[JValue::Object(&uri)],
        )?
        .l()?;
    if stream.is_null() {
        return Err(jni::errors::Error::NullPtr("openInputStream"));
    }
    Ok(stream)
}

fn read_stream(env: &mut JNIEnv, stream: &JObject) -> Result<Vec<u8>, jni::errors::Error> {
    let buffer = env.new_byte_array(READ_CHUNK)?;
    let mut bytes = Vec::new();
    loop {
        let read = env
            .call_method(stream, "read", "([B)I", &[JValue::Object(buffer.as_ref())])?
            .i()?;
        // -1 at end of stream
        let Ok(read) = usize::try_from(read) else {
            break;
        };
        let chunk = env.convert_byte_array(&buffer)?;
        bytes.extend_from_slice(&chunk[..read]);
    }
    Ok(bytes)
}

/// Every byte behind a `content://` uri
fn read_content(
    env: &mut JNIEnv,
    context: &JObject,
    uri: &str,
) -> Result<Vec<u8>, jni::errors::Error> {
    let stream = open_input_stream(env, context, uri)?;
    let bytes = read_stream(env, &stream);
    if env.exception_check()? {
        env.exception_clear()?;
    }
    env.call_method(&stream, "close", "()V", &[])?;
    bytes
}

/// Whether the entry holds at least one byte
fn has_content(
    env: &mut JNIEnv,
    context: &JObject,
    uri: &str,
) -> Result<bool, jni::errors::Error> {
    let stream = open_input_stream(env, context, uri)?;
    let first = env.call_method(&stream, "read", "()I", &[])?.i()?;
    env.call_method(&stream, "close", "()V", &[])?;
    Ok(first >= 0)
}

/// Content provider reads through the app's ContentResolver
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidContentReader;

impl ContentReader for AndroidContentReader {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
        let source = uri.to_string();
        on_helper_thread(move || with_jni(|env, context| read_content(env, context, &source)))
            .await
            .ok_or_else(|| StorageError::Unreadable {
                uri: uri.to_string(),
                message: "content helper exited".to_string(),
            })?
            .map_err(|e| StorageError::Unreadable {
                uri: uri.to_string(),
                message: format!("JNI error: {e}"),
            })
    }
}

/// New empty JPEG entry in the shared media store for the camera to write into
fn insert_capture_entry(
    env: &mut JNIEnv,
    context: &JObject,
    display_name: &str,
) -> Result<String, jni::errors::Error> {
    let values = env.new_object("android/content/ContentValues", "()V", &[])?;
    for (column, value) in [("_display_name", display_name), ("mime_type", "image/jpeg")] {
        let column = env.new_string(column)?;
        let value = env.new_string(value)?;
        env.call_method(
            &values,
            "put",
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[JValue::Object(&column), JValue::Object(&value)],
        )?;
    }

    let collection = env
        .get_static_field(
            "android/provider/MediaStore$Images$Media",
            "EXTERNAL_CONTENT_URI",
            "Landroid/net/Uri;",
        )?
        .l()?;
    let resolver = content_resolver(env, context)?;
    let entry = env
        .call_method(
            &resolver,
            "insert",
            "(Landroid/net/Uri;Landroid/content/ContentValues;)Landroid/net/Uri;",
            &[JValue::Object(&collection), JValue::Object(&values)],
        )?
        .l()?;
    if entry.is_null() {
        return Err(jni::errors::Error::NullPtr("MediaStore insert"));
    }
    to_rust_string(env, &entry)
}

fn delete_entry(
    env: &mut JNIEnv,
    context: &JObject,
    uri: &str,
) -> Result<(), jni::errors::Error> {
    let resolver = content_resolver(env, context)?;
    let uri = parse_uri(env, uri)?;
    env.call_method(
        &resolver,
        "delete",
        "(Landroid/net/Uri;Ljava/lang/String;[Ljava/lang/String;)I",
        &[
            JValue::Object(&uri),
            JValue::Object(&JObject::null()),
            JValue::Object(&JObject::null()),
        ],
    )?;
    Ok(())
}

fn discard_entry(uri: &str) {
    if let Err(e) = with_jni(|env, context| delete_entry(env, context, uri)) {
        log::warn!("Failed to remove unused capture entry {uri}: {e}");
    }
}

/// new Intent(MediaStore.ACTION_IMAGE_CAPTURE) writing into `output`
fn start_capture(
    env: &mut JNIEnv,
    activity: &JObject,
    output: &str,
) -> Result<(), jni::errors::Error> {
    let action = env
        .get_static_field(
            "android/provider/MediaStore",
            "ACTION_IMAGE_CAPTURE",
            "Ljava/lang/String;",
        )?
        .l()?;
    let intent = env.new_object(
        "android/content/Intent",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action)],
    )?;

    let extra = env
        .get_static_field("android/provider/MediaStore", "EXTRA_OUTPUT", "Ljava/lang/String;")?
        .l()?;
    let output = parse_uri(env, output)?;
    env.call_method(
        &intent,
        "putExtra",
        "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;",
        &[JValue::Object(&extra), JValue::Object(&output)],
    )?;
    env.call_method(
        &intent,
        "addFlags",
        "(I)Landroid/content/Intent;",
        &[JValue::Int(
            FLAG_GRANT_READ_URI_PERMISSION | FLAG_GRANT_WRITE_URI_PERMISSION,
        )],
    )?;

    env.call_method(
        activity,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(&intent)],
    )?;
    Ok(())
}

/// Wait for a started activity to cover ours and then give focus back.
/// Returns false when it never showed up.
fn wait_for_activity() -> bool {
    let round_trip = wait_for_focus(false, ACTIVITY_APPEAR_WAIT).and_then(|left| {
        if left {
            wait_for_focus(true, ACTIVITY_RETURN_WAIT)?;
        }
        Ok(left)
    });
    round_trip.unwrap_or_else(|e| {
        log::error!("JNI error while waiting for activity: {e}");
        false
    })
}

/// Capture into a fresh media entry. The camera app reports nothing back,
/// so an entry that is still empty afterwards means the user backed out.
fn capture_blocking() -> PickerResponse {
    let display_name = format!("capture_{}.jpg", SystemClock.now_millis());
    let entry = match with_jni(|env, context| insert_capture_entry(env, context, &display_name)) {
        Ok(entry) => entry,
        Err(e) => {
            log::error!("Could not create capture entry: {e}");
            return PickerResponse::Failed {
                code: PickerErrorCode::Others,
                message: format!("Could not create capture entry: {e}"),
            };
        }
    };

    if let Err(e) = with_jni(|env, activity| start_capture(env, activity, &entry)) {
        log::error!("Could not start camera: {e}");
        discard_entry(&entry);
        return camera_unavailable(ImageSource::Camera);
    }

    wait_for_activity();

    let captured = with_jni(|env, context| has_content(env, context, &entry)).unwrap_or(false);
    if !captured {
        discard_entry(&entry);
    }
    capture_response(entry, captured)
}

/// Instantiate an app class (AndroidX) through the activity's class loader
fn new_app_object<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
    class_name: &str,
) -> Result<JObject<'local>, jni::errors::Error> {
    let loader = env
        .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?
        .l()?;
    let class_name = env.new_string(class_name)?;
    let class: JClass = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&class_name)],
        )?
        .l()?
        .into();
    env.new_object(class, "()V", &[])
}

fn result_registry<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
) -> Result<JObject<'local>, jni::errors::Error> {
    env.call_method(
        activity,
        "getActivityResultRegistry",
        "()Landroidx/activity/result/ActivityResultRegistry;",
        &[],
    )?
    .l()
}

/// Start ACTION_GET_CONTENT for images under `key` in the activity result
/// registry. No callback is registered, so the registry keeps the result as
/// pending until it is read back with [`take_pending_result`].
fn launch_library_picker(
    env: &mut JNIEnv,
    activity: &JObject,
    key: &str,
) -> Result<GlobalRef, jni::errors::Error> {
    let action = env
        .get_static_field("android/content/Intent", "ACTION_GET_CONTENT", "Ljava/lang/String;")?
        .l()?;
    let intent = env.new_object(
        "android/content/Intent",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action)],
    )?;
    let image_type = env.new_string("image/*")?;
    env.call_method(
        &intent,
        "setType",
        "(Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&image_type)],
    )?;
    let openable = env
        .get_static_field("android/content/Intent", "CATEGORY_OPENABLE", "Ljava/lang/String;")?
        .l()?;
    env.call_method(
        &intent,
        "addCategory",
        "(Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&openable)],
    )?;

    let registry = result_registry(env, activity)?;
    let contract = new_app_object(env, activity, START_FOR_RESULT_CONTRACT)?;
    let key = env.new_string(key)?;
    let launcher = env
        .call_method(
            &registry,
            "register",
            "(Ljava/lang/String;Landroidx/activity/result/contract/ActivityResultContract;Landroidx/activity/result/ActivityResultCallback;)Landroidx/activity/result/ActivityResultLauncher;",
            &[
                JValue::Object(&key),
                JValue::Object(&contract),
                JValue::Object(&JObject::null()),
            ],
        )?
        .l()?;
    env.call_method(
        &launcher,
        "launch",
        "(Ljava/lang/Object;)V",
        &[JValue::Object(&intent)],
    )?;

    env.new_global_ref(launcher)
}

struct PendingResult {
    result_code: i32,
    uri: Option<String>,
    mime_type: Option<String>,
}

/// Look `key` up among the registry's pending results.
///
/// The registry only exposes them through its saved state, a bundle of
/// bundles; the one holding `key` maps it to an ActivityResult.
fn take_pending_result(
    env: &mut JNIEnv,
    activity: &JObject,
    key: &str,
) -> Result<Option<PendingResult>, jni::errors::Error> {
    let registry = result_registry(env, activity)?;
    let state = env.new_object("android/os/Bundle", "()V", &[])?;
    env.call_method(
        &registry,
        "onSaveInstanceState",
        "(Landroid/os/Bundle;)V",
        &[JValue::Object(&state)],
    )?;

    let key = env.new_string(key)?;
    let names = env.call_method(&state, "keySet", "()Ljava/util/Set;", &[])?.l()?;
    let names: JObjectArray = env
        .call_method(&names, "toArray", "()[Ljava/lang/Object;", &[])?
        .l()?
        .into();

    for index in 0..env.get_array_length(&names)? {
        let name = env.get_object_array_element(&names, index)?;
        let section = env
            .call_method(
                &state,
                "get",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&name)],
            )?
            .l()?;
        if section.is_null() || !env.is_instance_of(&section, "android/os/Bundle")? {
            continue;
        }
        let result = env
            .call_method(
                &section,
                "getParcelable",
                "(Ljava/lang/String;)Landroid/os/Parcelable;",
                &[JValue::Object(&key)],
            )?
            .l()?;
        if result.is_null() {
            continue;
        }

        let result_code = env.call_method(&result, "getResultCode", "()I", &[])?.i()?;
        let data = env
            .call_method(&result, "getData", "()Landroid/content/Intent;", &[])?
            .l()?;
        let uri = if data.is_null() {
            None
        } else {
            let uri = env
                .call_method(&data, "getData", "()Landroid/net/Uri;", &[])?
                .l()?;
            if uri.is_null() {
                None
            } else {
                Some(to_rust_string(env, &uri)?)
            }
        };
        let mime_type = match &uri {
            Some(uri) => content_type(env, activity, uri)?,
            None => None,
        };

        return Ok(Some(PendingResult {
            result_code,
            uri,
            mime_type,
        }));
    }

    Ok(None)
}

fn pick_blocking() -> PickerResponse {
    let key = format!("fieldsnap.library.{}", SystemClock.now_millis());
    let launcher = match with_jni(|env, activity| launch_library_picker(env, activity, &key)) {
        Ok(launcher) => launcher,
        Err(e) => {
            log::error!("Could not open photo library: {e}");
            return PickerResponse::Failed {
                code: PickerErrorCode::Others,
                message: format!("Could not open photo library: {e}"),
            };
        }
    };

    let opened = wait_for_activity();

    let deadline = Instant::now() + RESULT_WAIT;
    let pending = loop {
        match with_jni(|env, activity| take_pending_result(env, activity, &key)) {
            Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
            other => break other,
        }
    };

    if let Err(e) = with_jni(|env, _| {
        env.call_method(launcher.as_obj(), "unregister", "()V", &[])
            .map(|_| ())
    }) {
        log::warn!("Failed to unregister library picker: {e}");
    }

    match pending {
        Ok(Some(result)) => pick_response(result.result_code, result.uri, result.mime_type),
        Ok(None) if opened => PickerResponse::Cancelled,
        Ok(None) => PickerResponse::Failed {
            code: PickerErrorCode::Others,
            message: "Photo library did not open".to_string(),
        },
        Err(e) => PickerResponse::Failed {
            code: PickerErrorCode::Others,
            message: format!("JNI error: {e}"),
        },
    }
}

/// System camera and photo library, started from the hosting activity
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidPicker;

impl ImagePicker for AndroidPicker {
    async fn launch(&self, source: ImageSource, _options: &PickerOptions) -> PickerResponse {
        let response = on_helper_thread(move || match source {
            ImageSource::Camera => capture_blocking(),
            ImageSource::Library => pick_blocking(),
        })
        .await;
        response.unwrap_or_else(|| PickerResponse::Failed {
            code: PickerErrorCode::Others,
            message: "picker helper exited".to_string(),
        })
    }
}

/// One-shot fixes from the framework LocationManager
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidGeolocation;

impl Geolocation for AndroidGeolocation {
    async fn current_position(&self, options: &LocationOptions) -> Result<Position, LocationError> {
        let options = options.clone();
        on_helper_thread(move || locate_blocking(&options))
            .await
            .unwrap_or_else(|| {
                Err(LocationError::new(
                    LocationErrorCode::InternalError,
                    "location helper exited",
                ))
            })
    }
}

fn location_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
) -> Result<JObject<'local>, jni::errors::Error> {
    let service = env.new_string("location")?;
    env.call_method(
        context,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&service)],
    )?
    .l()
}

fn provider_enabled(
    env: &mut JNIEnv,
    context: &JObject,
    provider: &str,
) -> Result<bool, jni::errors::Error> {
    let manager = location_manager(env, context)?;
    let provider = env.new_string(provider)?;
    env.call_method(
        &manager,
        "isProviderEnabled",
        "(Ljava/lang/String;)Z",
        &[JValue::Object(&provider)],
    )?
    .z()
}

/// Open the system location settings page
fn open_location_settings(env: &mut JNIEnv, context: &JObject) -> Result<(), jni::errors::Error> {
    let settings = env.find_class("android/provider/Settings")?;
    let action = env.get_static_field(
        settings,
        "ACTION_LOCATION_SOURCE_SETTINGS",
        "Ljava/lang/String;",
    )?;

    let intent_class = env.find_class("android/content/Intent")?;
    let intent = env.new_object(
        intent_class,
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action.l()?)],
    )?;

    env.call_method(
        &intent,
        "addFlags",
        "(I)Landroid/content/Intent;",
        &[JValue::Int(FLAG_ACTIVITY_NEW_TASK)],
    )?;

    env.call_method(
        context,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(&intent)],
    )?;

    Ok(())
}

/// Ask the provider for updates so `getLastKnownLocation` gets refreshed.
/// Returns the PendingIntent that has to be handed back to `stop_updates`.
fn start_updates(
    env: &mut JNIEnv,
    context: &JObject,
    provider: &str,
    distance_filter: f32,
) -> Result<GlobalRef, jni::errors::Error> {
    let manager = location_manager(env, context)?;

    let action = env.new_string(FIX_ACTION)?;
    let intent = env.new_object(
        "android/content/Intent",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action)],
    )?;
    let pending_intent_class = env.find_class("android/app/PendingIntent")?;
    let pending_intent = env
        .call_static_method(
            pending_intent_class,
            "getBroadcast",
            "(Landroid/content/Context;ILandroid/content/Intent;I)Landroid/app/PendingIntent;",
            &[
                JValue::Object(context),
                JValue::Int(0),
                JValue::Object(&intent),
                JValue::Int(FLAG_UPDATE_CURRENT | FLAG_IMMUTABLE),
            ],
        )?
        .l()?;

    let provider = env.new_string(provider)?;
    env.call_method(
        &manager,
        "requestLocationUpdates",
        "(Ljava/lang/String;JFLandroid/app/PendingIntent;)V",
        &[
            JValue::Object(&provider),
            JValue::Long(0),
            JValue::Float(distance_filter),
            JValue::Object(&pending_intent),
        ],
    )?;

    env.new_global_ref(pending_intent)
}

fn stop_updates(
    env: &mut JNIEnv,
    context: &JObject,
    pending_intent: &JObject,
) -> Result<(), jni::errors::Error> {
    let manager = location_manager(env, context)?;
    env.call_method(
        &manager,
        "removeUpdates",
        "(Landroid/app/PendingIntent;)V",
        &[JValue::Object(pending_intent)],
    )?;
    Ok(())
}

fn last_known_position(
    env: &mut JNIEnv,
    context: &JObject,
    provider: &str,
) -> Result<Option<Position>, jni::errors::Error> {
    let manager = location_manager(env, context)?;
    let provider = env.new_string(provider)?;
    let location = env
        .call_method(
            &manager,
            "getLastKnownLocation",
            "(Ljava/lang/String;)Landroid/location/Location;",
            &[JValue::Object(&provider)],
        )?
        .l()?;
    if location.is_null() {
        return Ok(None);
    }

    let latitude = env.call_method(&location, "getLatitude", "()D", &[])?.d()?;
    let longitude = env.call_method(&location, "getLongitude", "()D", &[])?.d()?;
    let accuracy = if env.call_method(&location, "hasAccuracy", "()Z", &[])?.z()? {
        Some(f64::from(
            env.call_method(&location, "getAccuracy", "()F", &[])?.f()?,
        ))
    } else {
        None
    };
    let altitude = if env.call_method(&location, "hasAltitude", "()Z", &[])?.z()? {
        Some(env.call_method(&location, "getAltitude", "()D", &[])?.d()?)
    } else {
        None
    };
    let timestamp = env.call_method(&location, "getTime", "()J", &[])?.j()?;

    Ok(Some(Position {
        coords: Coordinates {
            longitude,
            latitude,
            accuracy,
            altitude,
        },
        timestamp,
    }))
}

/// Wait for a fix no older than `maximum_age`, giving up after `timeout`.
fn locate_blocking(options: &LocationOptions) -> Result<Position, LocationError> {
    let provider = if options.enable_high_accuracy {
        "gps"
    } else {
        "network"
    };

    let enabled = with_jni(|env, context| provider_enabled(env, context, provider))
        .map_err(location_error)?;
    if !enabled {
        if options.show_location_dialog {
            with_jni(|env, context| open_location_settings(env, context))
                .map_err(location_error)?;
        }
        return Err(LocationError::new(
            LocationErrorCode::SettingsNotSatisfied,
            "Location settings are not satisfied.",
        ));
    }

    let pending_intent = with_jni(|env, context| {
        start_updates(env, context, provider, options.distance_filter)
    })
    .map_err(location_error)?;

    let max_age = i64::try_from(options.maximum_age.as_millis()).unwrap_or(i64::MAX);
    let deadline = Instant::now() + options.timeout;
    let result = loop {
        match with_jni(|env, context| last_known_position(env, context, provider)) {
            Ok(Some(position)) if SystemClock.now_millis() - position.timestamp <= max_age => {
                break Ok(position);
            }
            Ok(_) => {}
            Err(e) => break Err(location_error(e)),
        }
        if Instant::now() >= deadline {
            break Err(LocationError::timeout());
        }
        thread::sleep(POLL_INTERVAL);
    };

    if let Err(e) = with_jni(|env, context| stop_updates(env, context, pending_intent.as_obj())) {
        log::warn!("Failed to stop location updates: {e}");
    }

    result
}
